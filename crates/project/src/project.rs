use std::collections::HashSet;
use std::fs;
use std::rc::Rc;

use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use crossbeam_channel::Sender;
use graphql_analysis::{collect_diagnostics, collect_fragments, Fragments};
use graphql_config::ResolvedProject;
use graphql_syntax::{extract_query_documents, QueryDocument};
use graphql_types::{Diagnostic, FileUri, Language, Position};
use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::{ProjectError, ProjectId, ProjectTask, Result};

/// Receives the complete diagnostic list for one file. An empty list clears
/// whatever was published for that file before.
pub type DiagnosticsHandler = Rc<dyn Fn(&FileUri, Vec<Diagnostic>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    Ready,
}

/// One schema and the query documents of every file it includes.
///
/// A project starts out scanning. Until [`Project::scan`] completes,
/// changes are tracked but nothing is validated or published.
pub struct Project {
    id: ProjectId,
    config: ResolvedProject,
    schema: Valid<Schema>,
    schema_uri: FileUri,
    state: State,
    needs_validation: bool,
    /// Tracked files in first-seen order, each with its documents in order
    /// of occurrence
    documents: IndexMap<FileUri, Vec<QueryDocument>>,
    /// Files that received a non-stale publication in the last pass
    published: HashSet<FileUri>,
    on_diagnostics: Option<DiagnosticsHandler>,
    tasks: Sender<ProjectTask>,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("id", &self.id)
            .field("name", &self.display_name())
            .field("state", &self.state)
            .field("needs_validation", &self.needs_validation)
            .field("files", &self.documents.len())
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Build a project from its configuration, reading and parsing the
    /// schema. Scanning is left to the caller.
    ///
    /// A missing schema path, an unreadable schema file, or schema text that
    /// does not parse is fatal for this project. Schema validation errors
    /// are logged and the schema is used as is.
    pub fn new(id: ProjectId, config: ResolvedProject, tasks: Sender<ProjectTask>) -> Result<Self> {
        let (schema, schema_uri) = load_schema(&config)?;

        tracing::info!(
            project = %config.display_name(),
            schema = %schema_uri,
            types = schema.types.len(),
            "Loaded project schema"
        );

        Ok(Self {
            id,
            config,
            schema,
            schema_uri,
            state: State::Scanning,
            needs_validation: false,
            documents: IndexMap::new(),
            published: HashSet::new(),
            on_diagnostics: None,
            tasks,
        })
    }

    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    #[must_use]
    pub const fn config(&self) -> &ResolvedProject {
        &self.config
    }

    #[must_use]
    pub const fn schema(&self) -> &Valid<Schema> {
        &self.schema
    }

    /// URI of the schema file. Schema source locations carry this as their
    /// path.
    #[must_use]
    pub const fn schema_uri(&self) -> &FileUri {
        &self.schema_uri
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        self.config.display_name()
    }

    /// Whether the initial scan has completed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    pub fn on_diagnostics(&mut self, handler: DiagnosticsHandler) {
        self.on_diagnostics = Some(handler);
    }

    /// Whether the file behind `uri` belongs to this project.
    #[must_use]
    pub fn includes_file(&self, uri: &FileUri) -> bool {
        uri.to_file_path()
            .is_some_and(|path| self.config.includes_path(&path))
    }

    /// Read every included file under the project root that is not tracked
    /// yet, then become ready and validate.
    ///
    /// Files already tracked were pushed by the editor and may be newer than
    /// what is on disk, so they are left alone. Unreadable files are logged
    /// and skipped.
    #[tracing::instrument(skip_all, fields(project = %self.display_name()))]
    pub fn scan(&mut self) {
        let mut scanned = 0usize;

        let config = self.config.clone();
        let entries = WalkDir::new(&config.config_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| !entry.file_type().is_dir() || !config.excludes_dir(entry.path()));
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(%error, "Skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if Language::from_path(path).is_none() || !self.config.includes_path(path) {
                continue;
            }
            let Some(uri) = FileUri::from_path(path) else {
                continue;
            };
            if self.documents.contains_key(&uri) {
                continue;
            }

            match fs::read_to_string(path) {
                Ok(text) => {
                    self.document_did_change(&uri, &text);
                    scanned += 1;
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "Failed to read file during scan");
                }
            }
        }

        tracing::info!(
            files = scanned,
            tracked = self.documents.len(),
            "Scan complete"
        );

        self.state = State::Ready;
        self.validate_if_needed();
    }

    /// Re-read a file from disk and re-extract its documents.
    pub fn file_did_change(&mut self, uri: &FileUri) {
        if uri.language().is_none() {
            return;
        }
        let Some(path) = uri.to_file_path() else {
            tracing::debug!(uri = %uri, "Not a file URI");
            return;
        };

        match fs::read_to_string(&path) {
            Ok(text) => self.document_did_change(uri, &text),
            Err(error) => tracing::warn!(uri = %uri, %error, "Failed to read changed file"),
        }
    }

    /// Replace the documents tracked for a file with those extracted from
    /// `text`. A file without any GraphQL stops being tracked.
    pub fn document_did_change(&mut self, uri: &FileUri, text: &str) {
        let Some(language) = uri.language() else {
            return;
        };

        match extract_query_documents(uri, text, language) {
            Some(documents) => {
                tracing::debug!(uri = %uri, documents = documents.len(), "Tracking query documents");
                self.documents.insert(uri.clone(), documents);
                self.invalidate();
            }
            None => self.remove_query_documents_for(uri),
        }
    }

    pub fn file_was_deleted(&mut self, uri: &FileUri) {
        self.remove_query_documents_for(uri);
    }

    fn remove_query_documents_for(&mut self, uri: &FileUri) {
        if self.documents.shift_remove(uri).is_some() {
            tracing::debug!(uri = %uri, "Stopped tracking file");
            self.invalidate();
        }
    }

    /// Mark the project dirty. Only the first change after a pass queues a
    /// validation task; later ones find the flag already set.
    fn invalidate(&mut self) {
        if !self.needs_validation && self.state == State::Ready {
            self.schedule_validation();
        }
        self.needs_validation = true;
    }

    fn schedule_validation(&self) {
        if let Err(error) = self.tasks.send(ProjectTask::Validate(self.id)) {
            tracing::debug!(project = %self.id, %error, "Task queue closed, validation not scheduled");
        }
    }

    /// Run a validation pass if anything changed since the last one.
    ///
    /// Every tracked file gets its full diagnostic list published, and every
    /// file published before but no longer tracked gets an empty list.
    #[tracing::instrument(skip_all, fields(project = %self.display_name()))]
    pub fn validate_if_needed(&mut self) {
        if !self.needs_validation {
            return;
        }
        let Some(on_diagnostics) = self.on_diagnostics.clone() else {
            return;
        };

        let fragments = self.fragments();
        let mut published = HashSet::with_capacity(self.documents.len());

        for (uri, documents) in &self.documents {
            let diagnostics: Vec<Diagnostic> = documents
                .iter()
                .flat_map(|document| collect_diagnostics(&self.schema, document, &fragments))
                .collect();
            tracing::trace!(uri = %uri, diagnostics = diagnostics.len(), "Publishing diagnostics");
            on_diagnostics(uri, diagnostics);
            published.insert(uri.clone());
        }

        let mut stale: Vec<&FileUri> = self.published.difference(&published).collect();
        stale.sort();
        for uri in stale {
            tracing::trace!(uri = %uri, "Clearing diagnostics for untracked file");
            on_diagnostics(uri, Vec::new());
        }

        tracing::debug!(
            files = published.len(),
            fragments = fragments.len(),
            "Validation pass complete"
        );

        self.published = published;
        self.needs_validation = false;
    }

    /// Files whose diagnostics were published by the last validation pass.
    pub fn published_files(&self) -> impl Iterator<Item = &FileUri> {
        self.published.iter()
    }

    /// Documents extracted from one file, in order of occurrence.
    #[must_use]
    pub fn query_documents_at(&self, uri: &FileUri) -> Option<&[QueryDocument]> {
        self.documents.get(uri).map(Vec::as_slice)
    }

    /// The first document of a file whose lines contain `position`.
    #[must_use]
    pub fn query_document_at(&self, uri: &FileUri, position: Position) -> Option<&QueryDocument> {
        self.query_documents_at(uri)?
            .iter()
            .find(|document| document.contains_position(position))
    }

    /// Every tracked document, file by file.
    pub fn query_documents(&self) -> impl Iterator<Item = &QueryDocument> {
        self.documents.values().flatten()
    }

    /// Tracked files in first-seen order.
    pub fn files(&self) -> impl Iterator<Item = &FileUri> {
        self.documents.keys()
    }

    /// Fragment definitions across all tracked documents, rebuilt on every
    /// call.
    #[must_use]
    pub fn fragments(&self) -> Fragments {
        collect_fragments(self.query_documents())
    }
}

fn load_schema(config: &ResolvedProject) -> Result<(Valid<Schema>, FileUri)> {
    let project = config.display_name();
    let Some(path) = &config.schema_path else {
        return Err(ProjectError::Configuration {
            project,
            message: "No schemaPath configured".to_string(),
        });
    };

    let text = fs::read_to_string(path).map_err(|source| ProjectError::SchemaIo {
        project: project.clone(),
        path: path.clone(),
        source,
    })?;
    let uri = FileUri::from_path(path)
        .unwrap_or_else(|| FileUri::new(path.to_string_lossy().as_ref()));

    let schema = Schema::parse(text, uri.as_str()).map_err(|with_errors| {
        ProjectError::Configuration {
            project: project.clone(),
            message: format!("Invalid schema {}: {}", path.display(), with_errors.errors),
        }
    })?;

    let schema = match schema.validate() {
        Ok(schema) => schema,
        Err(with_errors) => {
            tracing::warn!(
                project = %project,
                errors = with_errors.errors.len(),
                "Schema validation errors found (schema still used for documents)"
            );
            Valid::assume_valid(with_errors.partial)
        }
    };

    Ok((schema, uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_config::ProjectConfig;
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::TempDir;

    type Published = Rc<RefCell<Vec<(FileUri, Vec<Diagnostic>)>>>;

    fn resolved(dir: &Path, schema_path: Option<&str>) -> ResolvedProject {
        let config = ProjectConfig {
            schema_path: schema_path.map(str::to_string),
            ..ProjectConfig::default()
        };
        ResolvedProject::new(None, &config, dir, &dir.join(".graphqlconfig")).unwrap()
    }

    fn project_in(dir: &TempDir) -> (Project, crossbeam_channel::Receiver<ProjectTask>, Published) {
        fs::write(dir.path().join("schema.graphql"), "type Query { field: String }").unwrap();
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut project = Project::new(
            ProjectId(1),
            resolved(dir.path(), Some("schema.graphql")),
            sender,
        )
        .unwrap();

        let published: Published = Rc::default();
        let sink = Rc::clone(&published);
        project.on_diagnostics(Rc::new(move |uri: &FileUri, diagnostics: Vec<Diagnostic>| {
            sink.borrow_mut().push((uri.clone(), diagnostics));
        }));
        (project, receiver, published)
    }

    fn uri(dir: &TempDir, name: &str) -> FileUri {
        FileUri::from_path(&dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_missing_schema_path_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let (sender, _receiver) = crossbeam_channel::unbounded();
        let error = Project::new(ProjectId(1), resolved(dir.path(), None), sender).unwrap_err();
        assert!(matches!(error, ProjectError::Configuration { .. }));
    }

    #[test]
    fn test_unreadable_schema_is_io_error() {
        let dir = TempDir::new().unwrap();
        let (sender, _receiver) = crossbeam_channel::unbounded();
        let error = Project::new(
            ProjectId(1),
            resolved(dir.path(), Some("missing.graphql")),
            sender,
        )
        .unwrap_err();
        assert!(matches!(error, ProjectError::SchemaIo { .. }));
    }

    #[test]
    fn test_unparsable_schema_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.graphql"), "type Query {").unwrap();
        let (sender, _receiver) = crossbeam_channel::unbounded();
        let error = Project::new(
            ProjectId(1),
            resolved(dir.path(), Some("schema.graphql")),
            sender,
        )
        .unwrap_err();
        assert!(matches!(error, ProjectError::Configuration { .. }));
    }

    #[test]
    fn test_changes_while_scanning_are_tracked_but_not_published() {
        let dir = TempDir::new().unwrap();
        let (mut project, receiver, published) = project_in(&dir);

        project.document_did_change(&uri(&dir, "a.graphql"), "query { field }");

        assert!(!project.is_ready());
        assert!(project.query_documents_at(&uri(&dir, "a.graphql")).is_some());
        assert!(receiver.try_recv().is_err());
        assert!(published.borrow().is_empty());
    }

    #[test]
    fn test_scan_keeps_documents_pushed_by_editor() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.graphql"), "query { missing }").unwrap();
        let (mut project, _receiver, published) = project_in(&dir);

        project.document_did_change(&uri(&dir, "a.graphql"), "query { field }");
        project.scan();

        assert!(project.is_ready());
        let published = published.borrow();
        assert_eq!(published.len(), 1);
        assert!(published[0].1.is_empty());
    }

    #[test]
    fn test_scan_skips_schema_and_unrelated_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "query { field }").unwrap();
        fs::write(dir.path().join("a.ts"), "gql`{ field }`").unwrap();
        let (mut project, _receiver, _published) = project_in(&dir);

        project.scan();

        let files: Vec<_> = project.files().cloned().collect();
        assert_eq!(files, vec![uri(&dir, "a.ts")]);
    }

    #[test]
    fn test_scan_skips_excluded_directories() {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("node_modules").join("pkg");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join("q.graphql"), "query { field }").unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("a.graphql"), "query { field }").unwrap();
        let (mut project, _receiver, _published) = project_in(&dir);

        project.scan();

        let files: Vec<_> = project.files().cloned().collect();
        assert_eq!(files, vec![uri(&dir, "src/a.graphql")]);
    }

    #[test]
    fn test_changes_coalesce_into_one_task() {
        let dir = TempDir::new().unwrap();
        let (mut project, receiver, published) = project_in(&dir);
        project.scan();

        project.document_did_change(&uri(&dir, "a.graphql"), "query { field }");
        project.document_did_change(&uri(&dir, "b.graphql"), "query { field }");
        project.document_did_change(&uri(&dir, "a.graphql"), "query { nope }");

        assert_eq!(receiver.try_iter().count(), 1);
        assert!(published.borrow().is_empty());

        project.validate_if_needed();
        project.validate_if_needed();

        let published = published.borrow();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].1.len(), 1);
        assert!(published[1].1.is_empty());
    }

    #[test]
    fn test_file_without_graphql_is_untracked() {
        let dir = TempDir::new().unwrap();
        let (mut project, _receiver, _published) = project_in(&dir);
        let file = uri(&dir, "a.ts");

        project.document_did_change(&file, "gql`{ field }`");
        assert!(project.query_documents_at(&file).is_some());

        project.document_did_change(&file, "const x = 1;");
        assert!(project.query_documents_at(&file).is_none());
    }

    #[test]
    fn test_query_document_at_uses_line_span() {
        let dir = TempDir::new().unwrap();
        let (mut project, _receiver, _published) = project_in(&dir);
        let file = uri(&dir, "a.ts");

        project.document_did_change(
            &file,
            "const A = gql`\n  query A { field }\n`;\n\nconst B = gql`query B { field }`;",
        );

        let first = project.query_document_at(&file, Position::new(1, 0)).unwrap();
        let second = project.query_document_at(&file, Position::new(4, 0)).unwrap();
        assert_ne!(first.offset(), second.offset());
        assert!(project.query_document_at(&file, Position::new(3, 0)).is_none());
    }

    #[test]
    fn test_includes_file() {
        let dir = TempDir::new().unwrap();
        let (project, _receiver, _published) = project_in(&dir);

        assert!(project.includes_file(&uri(&dir, "src/a.graphql")));
        assert!(!project.includes_file(&uri(&dir, "schema.graphql")));
        assert!(!project.includes_file(&uri(&dir, "node_modules/lib/a.graphql")));
        assert!(!project.includes_file(&FileUri::new("file:///elsewhere/a.graphql")));
    }
}
