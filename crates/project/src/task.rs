/// Identifies a project within a workspace for the lifetime of the
/// workspace. Ids are never reused, so a task queued for a project that has
/// since been removed finds nothing to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub(crate) u64);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deferred work for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectTask {
    /// Read every included file from disk, then validate
    Scan(ProjectId),
    /// Run a validation pass if one is still needed
    Validate(ProjectId),
}

impl ProjectTask {
    #[must_use]
    pub const fn project(self) -> ProjectId {
        match self {
            Self::Scan(id) | Self::Validate(id) => id,
        }
    }
}
