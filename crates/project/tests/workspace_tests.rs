//! Integration tests for graphql-project.
//!
//! Each test lays out a workspace folder on disk (config, schema and
//! documents), drives a `Workspace` through its public API and inspects what
//! was published.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use graphql_config::ConfigError;
use graphql_project::{ProjectError, Workspace};
use graphql_types::{Diagnostic, DiagnosticSeverity, FileUri, Position};
use tempfile::TempDir;

const SCHEMA: &str = "type Query { field: String user: User }\ntype User { id: ID! }";

type Published = Rc<RefCell<Vec<(FileUri, Vec<Diagnostic>)>>>;

struct TestWorkspace {
    dir: TempDir,
    workspace: Workspace,
    published: Published,
}

impl TestWorkspace {
    fn new(config: &str, files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".graphqlconfig", config);
        for (name, text) in files {
            write(dir.path(), name, text);
        }

        let published: Published = Rc::default();
        let sink = Rc::clone(&published);
        let mut workspace = Workspace::new();
        workspace.on_diagnostics(Rc::new(move |uri: &FileUri, diagnostics: Vec<Diagnostic>| {
            sink.borrow_mut().push((uri.clone(), diagnostics));
        }));

        Self {
            dir,
            workspace,
            published,
        }
    }

    /// A single project with `schema.graphql`, folder added and scanned.
    fn scanned(files: &[(&str, &str)]) -> Self {
        let mut files = files.to_vec();
        files.push(("schema.graphql", SCHEMA));
        let mut test = Self::new(r#"{ "schemaPath": "schema.graphql" }"#, &files);
        test.add_folder().unwrap();
        test.workspace.process_pending_tasks();
        test
    }

    fn add_folder(&mut self) -> graphql_project::Result<()> {
        let folder = self.dir.path().to_path_buf();
        self.workspace.add_projects_in_folder(&folder)
    }

    fn uri(&self, name: &str) -> FileUri {
        FileUri::from_path(&self.dir.path().join(name)).unwrap()
    }

    /// Most recent publication for a file.
    fn last_published(&self, name: &str) -> Option<Vec<Diagnostic>> {
        let uri = self.uri(name);
        self.published
            .borrow()
            .iter()
            .rev()
            .find(|(published, _)| *published == uri)
            .map(|(_, diagnostics)| diagnostics.clone())
    }

    fn publication_count(&self) -> usize {
        self.published.borrow().len()
    }
}

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

// ============================================================================
// publication
// ============================================================================

#[test]
fn test_valid_graphql_file_publishes_no_diagnostics() {
    let test = TestWorkspace::scanned(&[("a.graphql", "query { field }")]);

    assert_eq!(test.last_published("a.graphql"), Some(Vec::new()));
}

#[test]
fn test_embedded_error_is_located_in_containing_file() {
    let test = TestWorkspace::scanned(&[("b.ts", "const Q = gql`query { missingField }`;")]);

    let diagnostics = test.last_published("b.ts").unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Error);
    assert_eq!(diagnostics[0].range.start, Position::new(0, 22));
}

#[test]
fn test_schema_file_is_never_published() {
    let test = TestWorkspace::scanned(&[("a.graphql", "query { field }")]);

    assert_eq!(test.last_published("schema.graphql"), None);
}

#[test]
fn test_deleted_file_publishes_empty_list() {
    let mut test = TestWorkspace::scanned(&[("a.graphql", "query { nope }")]);
    assert_eq!(test.last_published("a.graphql").map(|d| d.len()), Some(1));

    fs::remove_file(test.dir.path().join("a.graphql")).unwrap();
    let uri = test.uri("a.graphql");
    test.workspace.file_was_deleted(&uri);
    test.workspace.process_pending_tasks();

    assert_eq!(test.last_published("a.graphql"), Some(Vec::new()));
}

#[test]
fn test_file_emptied_of_graphql_publishes_empty_list() {
    let mut test = TestWorkspace::scanned(&[("a.ts", "gql`query { nope }`;")]);
    assert_eq!(test.last_published("a.ts").map(|d| d.len()), Some(1));

    let uri = test.uri("a.ts");
    test.workspace.document_did_change(&uri, "export const nothing = 1;");
    test.workspace.process_pending_tasks();

    assert_eq!(test.last_published("a.ts"), Some(Vec::new()));
    assert!(test.workspace.project_for_file(&uri).unwrap().query_documents_at(&uri).is_none());
}

#[test]
fn test_fixing_an_error_publishes_empty_list() {
    let mut test = TestWorkspace::scanned(&[("a.graphql", "query { nope }")]);

    let uri = test.uri("a.graphql");
    test.workspace.document_did_change(&uri, "query { field }");
    test.workspace.process_pending_tasks();

    assert_eq!(test.last_published("a.graphql"), Some(Vec::new()));
}

#[test]
fn test_file_did_change_rereads_disk() {
    let mut test = TestWorkspace::scanned(&[("a.graphql", "query { field }")]);

    write(test.dir.path(), "a.graphql", "query { nope }");
    let uri = test.uri("a.graphql");
    test.workspace.file_did_change(&uri);
    test.workspace.process_pending_tasks();

    assert_eq!(test.last_published("a.graphql").map(|d| d.len()), Some(1));
}

// ============================================================================
// fragments
// ============================================================================

#[test]
fn test_duplicate_fragment_names_resolve_to_last_tracked() {
    let mut test = TestWorkspace::scanned(&[]);
    let one = test.uri("one.graphql");
    let two = test.uri("two.graphql");
    let three = test.uri("three.graphql");

    test.workspace
        .document_did_change(&one, "fragment F on Query { field }\nquery A { ...F }");
    test.workspace
        .document_did_change(&two, "fragment F on Query { user { id } }\nquery B { ...F }");
    test.workspace.document_did_change(&three, "query C { ...F }");
    test.workspace.process_pending_tasks();

    let project = test.workspace.project_for_file(&one).unwrap();
    assert_eq!(project.fragments()["F"].uri, two);

    for name in ["one.graphql", "two.graphql", "three.graphql"] {
        assert_eq!(test.last_published(name), Some(Vec::new()), "{name}");
    }
}

#[test]
fn test_fragment_defined_in_script_resolves_in_graphql_file() {
    let test = TestWorkspace::scanned(&[
        ("src/fragments.ts", "export const F = gql`fragment UserId on User { id }`;"),
        ("src/query.graphql", "query { user { ...UserId } }"),
    ]);

    assert_eq!(test.last_published("src/query.graphql"), Some(Vec::new()));
    assert_eq!(test.last_published("src/fragments.ts"), Some(Vec::new()));
}

#[test]
fn test_removing_fragment_definition_revalidates_users() {
    let mut test = TestWorkspace::scanned(&[
        ("fragments.graphql", "fragment UserId on User { id }"),
        ("query.graphql", "query { user { ...UserId } }"),
    ]);
    assert_eq!(test.last_published("query.graphql"), Some(Vec::new()));

    let uri = test.uri("fragments.graphql");
    test.workspace.file_was_deleted(&uri);
    test.workspace.process_pending_tasks();

    assert_eq!(test.last_published("query.graphql").map(|d| d.len()), Some(1));
}

// ============================================================================
// scheduling
// ============================================================================

#[test]
fn test_scanning_project_does_not_publish() {
    let mut test = TestWorkspace::new(
        r#"{ "schemaPath": "schema.graphql" }"#,
        &[("schema.graphql", SCHEMA)],
    );
    test.add_folder().unwrap();

    let uri = test.uri("a.graphql");
    test.workspace.document_did_change(&uri, "query { field }");
    assert_eq!(test.publication_count(), 0);
    assert!(test.workspace.has_pending_tasks());

    test.workspace.process_pending_tasks();
    assert_eq!(test.last_published("a.graphql"), Some(Vec::new()));
}

#[test]
fn test_changes_between_drains_coalesce_into_one_pass() {
    let mut test = TestWorkspace::scanned(&[
        ("a.graphql", "query A { field }"),
        ("b.graphql", "query B { field }"),
    ]);
    let before = test.publication_count();

    let a = test.uri("a.graphql");
    let b = test.uri("b.graphql");
    test.workspace.document_did_change(&a, "query A { nope }");
    test.workspace.document_did_change(&b, "query B { nope }");
    test.workspace.document_did_change(&a, "query A { field }");

    assert_eq!(test.workspace.process_pending_tasks(), 1);
    assert_eq!(test.publication_count(), before + 2);
    assert_eq!(test.last_published("a.graphql"), Some(Vec::new()));
    assert_eq!(test.last_published("b.graphql").map(|d| d.len()), Some(1));

    assert_eq!(test.workspace.process_pending_tasks(), 0);
}

#[test]
fn test_removed_folder_discards_queued_tasks() {
    let mut test = TestWorkspace::new(
        r#"{ "schemaPath": "schema.graphql" }"#,
        &[("schema.graphql", SCHEMA), ("a.graphql", "query { field }")],
    );
    test.add_folder().unwrap();

    let folder = test.dir.path().to_path_buf();
    assert!(test.workspace.remove_projects_in_folder(&folder));
    assert_eq!(test.workspace.process_pending_tasks(), 1);

    assert_eq!(test.publication_count(), 0);
    assert!(test.workspace.project_for_file(&test.uri("a.graphql")).is_none());
}

// ============================================================================
// configuration and routing
// ============================================================================

const MULTI_PROJECT_CONFIG: &str = r#"{
  "projects": {
    "client": { "schemaPath": "client.graphql", "includes": ["src/**"] },
    "server": { "schemaPath": "schema.graphql", "include": "other/**" }
  }
}"#;

#[test]
fn test_routing_takes_first_matching_project_in_config_order() {
    let mut test = TestWorkspace::new(
        MULTI_PROJECT_CONFIG,
        &[
            ("client.graphql", "type Query { local: Boolean }"),
            ("schema.graphql", SCHEMA),
        ],
    );
    test.add_folder().unwrap();

    let name_for = |name: &str| {
        test.workspace
            .project_for_file(&test.uri(name))
            .and_then(|project| project.config().name.clone())
    };
    assert_eq!(name_for("src/app.ts").as_deref(), Some("client"));
    assert_eq!(name_for("other/app.ts").as_deref(), Some("server"));
    assert_eq!(name_for("node_modules/lib/app.ts"), None);
}

#[test]
fn test_each_project_validates_against_its_own_schema() {
    let mut test = TestWorkspace::new(
        MULTI_PROJECT_CONFIG,
        &[
            ("client.graphql", "type Query { local: Boolean }"),
            ("schema.graphql", SCHEMA),
            ("src/a.graphql", "query { local }"),
            ("other/b.graphql", "query { local }"),
        ],
    );
    test.add_folder().unwrap();
    test.workspace.process_pending_tasks();

    assert_eq!(test.last_published("src/a.graphql"), Some(Vec::new()));
    assert_eq!(test.last_published("other/b.graphql").map(|d| d.len()), Some(1));
}

#[test]
fn test_project_without_schema_is_reported_and_siblings_survive() {
    let mut test = TestWorkspace::new(
        r#"{
          "projects": {
            "broken": { "includes": ["broken/**"] },
            "ok": { "schemaPath": "schema.graphql" }
          }
        }"#,
        &[("schema.graphql", SCHEMA)],
    );

    let error = test.add_folder().unwrap_err();
    assert!(matches!(error, ProjectError::Configuration { .. }));
    assert_eq!(test.workspace.projects().count(), 1);
}

#[test]
fn test_folder_without_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("no-config-here");
    let mut workspace = Workspace::new();

    let error = workspace.add_projects_in_folder(&nested).unwrap_err();
    assert!(matches!(error, ProjectError::Config(ConfigError::NotFound(_))));
}

#[test]
fn test_reloading_folder_replaces_projects() {
    let mut test = TestWorkspace::scanned(&[("a.graphql", "query { field }")]);
    assert_eq!(test.workspace.projects().count(), 1);

    test.add_folder().unwrap();
    assert_eq!(test.workspace.projects().count(), 1);
    assert!(!test.workspace.projects().any(graphql_project::Project::is_ready));
}

#[test]
fn test_reloading_folder_clears_files_no_longer_included() {
    let mut test = TestWorkspace::scanned(&[
        ("src/a.graphql", "query { missing }"),
        ("other/b.graphql", "query { missing }"),
    ]);
    assert_eq!(test.last_published("other/b.graphql").unwrap().len(), 1);
    let before = test.publication_count();

    write(
        test.dir.path(),
        ".graphqlconfig",
        r#"{ "schemaPath": "schema.graphql", "includes": ["src/**"] }"#,
    );
    test.add_folder().unwrap();

    assert_eq!(test.last_published("other/b.graphql"), Some(Vec::new()));
    assert_eq!(test.publication_count(), before + 1);
    assert_eq!(test.last_published("src/a.graphql").unwrap().len(), 1);
}

#[test]
fn test_removed_folder_clears_published_diagnostics() {
    let mut test = TestWorkspace::scanned(&[("a.graphql", "query { missing }")]);
    assert_eq!(test.last_published("a.graphql").unwrap().len(), 1);

    let folder = test.dir.path().to_path_buf();
    assert!(test.workspace.remove_projects_in_folder(&folder));

    assert_eq!(test.last_published("a.graphql"), Some(Vec::new()));
}
