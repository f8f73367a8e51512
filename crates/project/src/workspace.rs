use std::path::{Path, PathBuf};
use std::rc::Rc;

use crossbeam_channel::{Receiver, Sender};
use graphql_config::{find_config, load_config, ConfigError, ResolvedProject};
use graphql_types::FileUri;
use indexmap::IndexMap;

use crate::{DiagnosticsHandler, Project, ProjectId, ProjectTask, Result};

/// The projects of every open workspace folder.
///
/// Folders keep the order in which they were added, and projects keep the
/// order of their config file. File routing takes the first project, in
/// that order, that includes the file.
pub struct Workspace {
    projects_by_folder: IndexMap<PathBuf, Vec<Project>>,
    on_diagnostics: Option<DiagnosticsHandler>,
    sender: Sender<ProjectTask>,
    receiver: Receiver<ProjectTask>,
    next_project_id: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            projects_by_folder: IndexMap::new(),
            on_diagnostics: None,
            sender,
            receiver,
            next_project_id: 0,
        }
    }

    /// Set the handler every project publishes through, including projects
    /// added later.
    pub fn on_diagnostics(&mut self, handler: DiagnosticsHandler) {
        for project in self.projects_by_folder.values_mut().flatten() {
            project.on_diagnostics(Rc::clone(&handler));
        }
        self.on_diagnostics = Some(handler);
    }

    /// Load the config governing `folder` and set up its projects, replacing
    /// any projects the folder had before. Each new project gets a scan
    /// queued.
    ///
    /// A project whose schema cannot be loaded is left out. Its siblings
    /// are still added, and the first such error is returned once they are.
    #[tracing::instrument(skip_all, fields(folder = %folder.display()))]
    pub fn add_projects_in_folder(&mut self, folder: &Path) -> Result<()> {
        let config_path =
            find_config(folder).ok_or_else(|| ConfigError::NotFound(folder.to_path_buf()))?;
        let config = load_config(&config_path)?;

        let mut projects = Vec::new();
        let mut first_error = None;

        for resolved in ResolvedProject::from_config(&config, &config_path)? {
            let id = self.allocate_project_id();
            match Project::new(id, resolved, self.sender.clone()) {
                Ok(mut project) => {
                    if let Some(handler) = &self.on_diagnostics {
                        project.on_diagnostics(Rc::clone(handler));
                    }
                    self.enqueue(ProjectTask::Scan(id));
                    projects.push(project);
                }
                Err(error) => {
                    tracing::error!(%error, "Failed to set up project");
                    first_error.get_or_insert(error);
                }
            }
        }

        tracing::info!(
            config = %config_path.display(),
            projects = projects.len(),
            "Added projects for folder"
        );
        if let Some(previous) = self.projects_by_folder.get(folder) {
            self.clear_published(previous, &projects);
        }
        self.projects_by_folder.insert(folder.to_path_buf(), projects);

        first_error.map_or(Ok(()), Err)
    }

    /// Drop every project of `folder` and clear what they published. Tasks
    /// still queued for them are discarded when drained.
    pub fn remove_projects_in_folder(&mut self, folder: &Path) -> bool {
        let removed = self.projects_by_folder.shift_remove(folder);
        if let Some(projects) = &removed {
            tracing::info!(folder = %folder.display(), projects = projects.len(), "Removed folder");
            self.clear_published(projects, &[]);
        }
        removed.is_some()
    }

    /// Publish empty lists for files the `retired` projects published,
    /// except files one of `successors` includes and will publish once
    /// scanned.
    fn clear_published(&self, retired: &[Project], successors: &[Project]) {
        let Some(handler) = &self.on_diagnostics else {
            return;
        };

        let mut stale: Vec<&FileUri> = retired
            .iter()
            .flat_map(Project::published_files)
            .filter(|uri| !successors.iter().any(|project| project.includes_file(uri)))
            .collect();
        stale.sort();
        stale.dedup();
        for uri in stale {
            tracing::trace!(uri = %uri, "Clearing diagnostics of retired project");
            handler(uri, Vec::new());
        }
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects_by_folder.values().flatten()
    }

    /// The first project that includes `uri`.
    #[must_use]
    pub fn project_for_file(&self, uri: &FileUri) -> Option<&Project> {
        self.projects().find(|project| project.includes_file(uri))
    }

    fn project_for_file_mut(&mut self, uri: &FileUri) -> Option<&mut Project> {
        let project = self
            .projects_by_folder
            .values_mut()
            .flatten()
            .find(|project| project.includes_file(uri));
        if project.is_none() {
            tracing::trace!(uri = %uri, "No project includes file");
        }
        project
    }

    fn project_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects_by_folder
            .values_mut()
            .flatten()
            .find(|project| project.id() == id)
    }

    pub fn file_did_change(&mut self, uri: &FileUri) {
        if let Some(project) = self.project_for_file_mut(uri) {
            project.file_did_change(uri);
        }
    }

    pub fn document_did_change(&mut self, uri: &FileUri, text: &str) {
        if let Some(project) = self.project_for_file_mut(uri) {
            project.document_did_change(uri, text);
        }
    }

    pub fn file_was_deleted(&mut self, uri: &FileUri) {
        if let Some(project) = self.project_for_file_mut(uri) {
            project.file_was_deleted(uri);
        }
    }

    /// Run every queued task, including tasks queued while draining.
    /// Returns how many ran.
    pub fn process_pending_tasks(&mut self) -> usize {
        let mut processed = 0;

        while let Ok(task) = self.receiver.try_recv() {
            processed += 1;
            let Some(project) = self.project_mut(task.project()) else {
                tracing::debug!(?task, "Dropping task for removed project");
                continue;
            };
            match task {
                ProjectTask::Scan(_) => project.scan(),
                ProjectTask::Validate(_) => project.validate_if_needed(),
            }
        }

        processed
    }

    #[must_use]
    pub fn has_pending_tasks(&self) -> bool {
        !self.receiver.is_empty()
    }

    fn allocate_project_id(&mut self) -> ProjectId {
        self.next_project_id += 1;
        ProjectId(self.next_project_id)
    }

    fn enqueue(&self, task: ProjectTask) {
        // Both ends live in `self`, so the queue cannot be disconnected.
        let _ = self.sender.send(task);
    }
}
