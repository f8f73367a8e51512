use std::sync::LazyLock;

use graphql_types::Language;
use regex::Regex;

use crate::SourceLocation;

/// `gql` immediately followed by a backtick template, allowing whitespace
/// between the tag and the template.
#[allow(clippy::expect_used)]
static GQL_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gql\s*`([^`]*)`").expect("gql template pattern is valid"));

/// GraphQL text found in a source file, together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedGraphQL {
    /// The GraphQL text, with interpolations replaced by whitespace
    pub source: String,
    /// Location of `source` within the containing file
    pub location: SourceLocation,
}

/// Extract every GraphQL text from a file's contents.
///
/// A `.graphql` file always yields exactly one entry covering the whole
/// text. Script files yield one entry per `gql` template, in order of
/// occurrence; an empty result means the file contains no GraphQL.
#[must_use]
pub fn extract_from_source(text: &str, language: Language) -> Vec<ExtractedGraphQL> {
    if !language.requires_extraction() {
        return vec![ExtractedGraphQL {
            source: text.to_string(),
            location: SourceLocation::of_span(text, 0, text.len()),
        }];
    }

    let extracted: Vec<ExtractedGraphQL> = GQL_TEMPLATE
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|body| ExtractedGraphQL {
            source: blank_placeholders(body.as_str()),
            location: SourceLocation::of_span(text, body.start(), body.len()),
        })
        .collect();

    tracing::trace!(
        language = language.language_id(),
        templates = extracted.len(),
        "scanned for gql templates"
    );

    extracted
}

/// Replace every `${...}` interpolation with whitespace of the same width.
///
/// Each replaced character becomes as many spaces as it has UTF-16 code
/// units, and line breaks are kept, so every line/column position after
/// an interpolation is unchanged. Braces nested inside the expression are
/// balanced; an unterminated interpolation is blanked to the end.
#[must_use]
pub fn blank_placeholders(template: &str) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' || chars.peek() != Some(&'{') {
            result.push(c);
            continue;
        }

        blank(&mut result, c);
        let mut depth = 0usize;
        for c in chars.by_ref() {
            blank(&mut result, c);
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    result
}

fn blank(result: &mut String, c: char) {
    match c {
        '\n' | '\r' => result.push(c),
        _ => {
            for _ in 0..c.len_utf16() {
                result.push(' ');
            }
        }
    }
}
