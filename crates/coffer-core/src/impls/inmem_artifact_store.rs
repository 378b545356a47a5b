//! InMemoryArtifactStore - 開発用・テスト用の ArtifactStore
//!
//! # 実装詳細
//! - 1 つの tokio Mutex で全テーブルを守る
//! - 一意性チェックと挿入を同じロックの中で行うので、同時 ingest でも
//!   同じ (job, file_type) のレコードは 1 件しか作られない

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{FileType, Job, JobArtifact, JobId, Project, ProjectId};
use crate::ports::{ArtifactStore, StoreError};

#[derive(Default)]
struct State {
    projects: HashMap<ProjectId, Project>,
    jobs: HashMap<JobId, Job>,

    /// Artifacts in insertion order.
    artifacts: Vec<JobArtifact>,

    /// Unique index on (job, file_type) into `artifacts`.
    by_job_and_type: HashMap<(JobId, FileType), usize>,
}

#[derive(Default)]
pub struct InMemoryArtifactStore {
    state: Mutex<State>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn create_project(&self, project: Project) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.projects.insert(project.id, project);
        Ok(())
    }

    async fn create_job(&self, job: Job) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.projects.contains_key(&job.project_id) {
            return Err(StoreError::ProjectNotFound(job.project_id));
        }
        state.jobs.insert(job.id, job);
        Ok(())
    }

    async fn find_job(&self, job_id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.state.lock().await.jobs.get(&job_id).cloned())
    }

    async fn find_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.state.lock().await.projects.get(&project_id).cloned())
    }

    async fn find_by_job_and_type(
        &self,
        job_id: JobId,
        file_type: FileType,
    ) -> Result<Option<JobArtifact>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .by_job_and_type
            .get(&(job_id, file_type))
            .and_then(|&idx| state.artifacts.get(idx))
            .cloned())
    }

    async fn create_artifacts(
        &self,
        job_id: JobId,
        artifacts: Vec<JobArtifact>,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<JobArtifact>, StoreError> {
        let mut state = self.state.lock().await;
        if !state.jobs.contains_key(&job_id) {
            return Err(StoreError::JobNotFound(job_id));
        }

        // 先に全件チェックしてから書き込む（all or nothing）
        let mut seen = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            let key = (artifact.job_id, artifact.file_type);
            if artifact.job_id != job_id
                || state.by_job_and_type.contains_key(&key)
                || seen.contains(&key)
            {
                return Err(StoreError::UniqueViolation {
                    job_id: artifact.job_id,
                    file_type: artifact.file_type,
                });
            }
            seen.push(key);
        }

        for artifact in &artifacts {
            let idx = state.artifacts.len();
            state
                .by_job_and_type
                .insert((artifact.job_id, artifact.file_type), idx);
            state.artifacts.push(artifact.clone());
        }
        if let Some(job) = state.jobs.get_mut(&job_id) {
            job.apply_artifacts_expire_at(expire_at);
        }

        Ok(artifacts)
    }

    async fn list_for_job(&self, job_id: JobId) -> Result<Vec<JobArtifact>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .artifacts
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.state.lock().await.artifacts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FileFormat, Sha256Digest, StoredFile};
    use crate::ports::{IdGenerator, SystemClock, UlidGenerator};

    struct Fixture {
        store: InMemoryArtifactStore,
        ids: UlidGenerator<SystemClock>,
        job: Job,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryArtifactStore::new();
        let ids = UlidGenerator::new(SystemClock);
        let project = Project {
            id: ids.generate_project_id(),
            path: "group/project".to_string(),
        };
        let job = Job::new(ids.generate_job_id(), project.id, "build");
        store.create_project(project).await.unwrap();
        store.create_job(job.clone()).await.unwrap();
        Fixture { store, ids, job }
    }

    fn artifact(f: &Fixture, file_type: FileType, sha: char) -> JobArtifact {
        let digest = Sha256Digest::parse(&sha.to_string().repeat(64)).unwrap();
        JobArtifact {
            id: f.ids.generate_artifact_id(),
            job_id: f.job.id,
            project_id: f.job.project_id,
            file_type,
            file_format: FileFormat::Zip,
            file_sha256: digest.clone(),
            file: StoredFile {
                key: format!("{}/{}", f.job.id, file_type),
                size: 3,
                sha256: digest,
            },
            expire_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_find_by_job_and_type() {
        let f = fixture().await;
        let archive = artifact(&f, FileType::Archive, '0');
        f.store
            .create_artifacts(f.job.id, vec![archive.clone()], None)
            .await
            .unwrap();

        let found = f
            .store
            .find_by_job_and_type(f.job.id, FileType::Archive)
            .await
            .unwrap();
        assert_eq!(found, Some(archive));
        assert!(
            f.store
                .find_by_job_and_type(f.job.id, FileType::Metadata)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn unique_violation_writes_nothing() {
        let f = fixture().await;
        f.store
            .create_artifacts(f.job.id, vec![artifact(&f, FileType::Archive, '0')], None)
            .await
            .unwrap();

        let result = f
            .store
            .create_artifacts(
                f.job.id,
                vec![
                    artifact(&f, FileType::Metadata, '0'),
                    artifact(&f, FileType::Archive, '1'),
                ],
                None,
            )
            .await;

        assert!(matches!(
            result,
            Err(StoreError::UniqueViolation { file_type: FileType::Archive, .. })
        ));
        assert_eq!(f.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_types_in_one_batch_are_rejected() {
        let f = fixture().await;
        let result = f
            .store
            .create_artifacts(
                f.job.id,
                vec![
                    artifact(&f, FileType::Archive, '0'),
                    artifact(&f, FileType::Archive, '0'),
                ],
                None,
            )
            .await;

        assert!(matches!(result, Err(StoreError::UniqueViolation { .. })));
        assert_eq!(f.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_artifacts_sets_job_expiration() {
        let f = fixture().await;
        let expire_at = Utc::now() + chrono::TimeDelta::days(1);
        f.store
            .create_artifacts(f.job.id, vec![artifact(&f, FileType::Archive, '0')], Some(expire_at))
            .await
            .unwrap();

        let job = f.store.find_job(f.job.id).await.unwrap().unwrap();
        assert_eq!(job.artifacts_expire_at(), Some(expire_at));
    }

    #[tokio::test]
    async fn unknown_job_is_rejected() {
        let f = fixture().await;
        let other = f.ids.generate_job_id();
        let result = f.store.create_artifacts(other, vec![], None).await;
        assert!(matches!(result, Err(StoreError::JobNotFound(id)) if id == other));
    }

    #[tokio::test]
    async fn job_requires_known_project() {
        let f = fixture().await;
        let orphan = Job::new(f.ids.generate_job_id(), f.ids.generate_project_id(), "orphan");
        assert!(matches!(
            f.store.create_job(orphan).await,
            Err(StoreError::ProjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_for_job_is_in_insertion_order() {
        let f = fixture().await;
        let archive = artifact(&f, FileType::Archive, '0');
        let metadata = artifact(&f, FileType::Metadata, '0');
        f.store
            .create_artifacts(f.job.id, vec![archive.clone(), metadata.clone()], None)
            .await
            .unwrap();

        let listed = f.store.list_for_job(f.job.id).await.unwrap();
        assert_eq!(listed, vec![archive, metadata]);
    }
}
