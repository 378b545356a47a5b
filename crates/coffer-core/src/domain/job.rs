//! Job and project records consumed by the ingestion service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{JobId, ProjectId};

/// A project owning CI jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    /// Full path, e.g. `group/project`.
    pub path: String,
}

/// A finished CI job.
///
/// `artifacts_expire_at` is derived from the artifacts the job owns: it is
/// written by the artifact store together with the artifact records and has
/// no setter here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub project_id: ProjectId,

    /// Human-readable job name (`build`, `rspec 1/2`, ...).
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    artifacts_expire_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(id: JobId, project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
            artifacts_expire_at: None,
        }
    }

    pub fn artifacts_expire_at(&self) -> Option<DateTime<Utc>> {
        self.artifacts_expire_at
    }

    /// Record the expiration applied to a freshly created artifact set.
    ///
    /// Meant for `ArtifactStore` implementations, inside the same critical
    /// section that inserts the artifacts.
    pub fn apply_artifacts_expire_at(&mut self, expire_at: Option<DateTime<Utc>>) {
        self.artifacts_expire_at = expire_at;
    }
}
