//! ArtifactStore port - job / project / artifact レコードの正本
//!
//! # 設計原則
//! - (job, file_type) の一意性はストア側でも保証する（同時アップロード対策）
//! - 1 回の ingest で作られるレコードは `create_artifacts` で原子的に保存する
//! - job の `artifacts_expire_at` も同じクリティカルセクションで更新する

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{FileType, Job, JobArtifact, JobId, Project, ProjectId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    /// Another artifact with the same (job, file_type) was committed first.
    #[error("artifact {file_type} already exists for job {job_id}")]
    UniqueViolation { job_id: JobId, file_type: FileType },

    #[error("artifact store backend failure: {0}")]
    Backend(String),
}

/// ArtifactStore は job と artifact のメタデータを保存する
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn create_project(&self, project: Project) -> Result<(), StoreError>;

    /// Register a job. Fails if its project is unknown.
    async fn create_job(&self, job: Job) -> Result<(), StoreError>;

    async fn find_job(&self, job_id: JobId) -> Result<Option<Job>, StoreError>;

    async fn find_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError>;

    async fn find_by_job_and_type(
        &self,
        job_id: JobId,
        file_type: FileType,
    ) -> Result<Option<JobArtifact>, StoreError>;

    /// Insert all `artifacts` of one ingest and set the job's
    /// `artifacts_expire_at`, all or nothing.
    ///
    /// Returns [`StoreError::UniqueViolation`] without writing anything if any
    /// (job, file_type) pair is already taken, including duplicates within
    /// `artifacts` itself.
    async fn create_artifacts(
        &self,
        job_id: JobId,
        artifacts: Vec<JobArtifact>,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<JobArtifact>, StoreError>;

    /// Artifacts of a job in creation order.
    async fn list_for_job(&self, job_id: JobId) -> Result<Vec<JobArtifact>, StoreError>;

    /// Total number of artifact records.
    async fn count(&self) -> Result<usize, StoreError>;
}
