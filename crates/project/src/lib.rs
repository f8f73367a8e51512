//! Project and workspace model.
//!
//! A [`Workspace`] holds the [`Project`]s configured for each open folder
//! and routes files to them. A project tracks the query documents of every
//! file it includes and republishes the full diagnostic set of each file
//! whenever its documents change.
//!
//! Nothing here runs on its own. Mutations enqueue [`ProjectTask`]s and the
//! owner of the workspace drains them with
//! [`Workspace::process_pending_tasks`], typically once per incoming editor
//! message. Any number of changes between two drains cost a single
//! validation pass per project.

mod error;
mod project;
mod task;
mod workspace;

pub use error::{ProjectError, Result};
pub use project::{DiagnosticsHandler, Project};
pub use task::{ProjectId, ProjectTask};
pub use workspace::Workspace;
