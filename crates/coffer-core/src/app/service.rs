//! CreateJobArtifactsService - job artifact の取り込み
//!
//! # 処理の流れ
//! 1. パラメータ検証・job の存在確認・サイズ上限チェック
//! 2. 重複チェック（同じ job / type の artifact があるか）
//! 3. expire_at の決定（1 回だけ計算し、全 artifact と job に同じ値を使う。範囲外なら bad_request）
//! 4. 本体を ContentStore にステージング（primary → metadata の順）
//! 5. レコードを ArtifactStore に原子的にコミット
//!
//! 失敗はすべて `ServiceResponse` に変換され、呼び出し側に Err や panic は返りません。
//! 失敗した呼び出しはレコードもステージ済みの本体も残しません。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    ArtifactParams, ExpireIn, ExpireInError, FileFormat, FileType, IngestError, Job, JobArtifact,
    ParamsError, RawArtifactParams, ServiceResponse, StoredFile, UploadedFile,
};
use crate::ports::{
    ApplicationSettings, ArtifactStore, Clock, ContentStore, ErrorTracker, IdGenerator,
    StoreError, TrackingContext,
};

/// One file of an ingest, before it is committed.
struct Staged<'a> {
    file_type: FileType,
    file_format: FileFormat,
    upload: &'a UploadedFile,
}

pub struct CreateJobArtifactsService {
    pub(crate) artifacts: Arc<dyn ArtifactStore>,
    pub(crate) content: Arc<dyn ContentStore>,
    pub(crate) tracker: Arc<dyn ErrorTracker>,
    pub(crate) settings: Arc<dyn ApplicationSettings>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl CreateJobArtifactsService {
    /// Ingest `artifacts_file` (and the optional `metadata_file`) for `job`.
    ///
    /// On success the created artifacts are reachable through the artifact
    /// store; a replay of an already ingested file succeeds without creating
    /// anything.
    pub async fn execute(
        &self,
        job: &Job,
        artifacts_file: &UploadedFile,
        params: &RawArtifactParams,
        metadata_file: Option<&UploadedFile>,
    ) -> ServiceResponse {
        match self.try_execute(job, artifacts_file, params, metadata_file).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_tracked() {
                    self.tracker.track_exception(&err, tracking_context(job, params));
                }
                err.to_response()
            }
        }
    }

    async fn try_execute(
        &self,
        job: &Job,
        artifacts_file: &UploadedFile,
        raw_params: &RawArtifactParams,
        metadata_file: Option<&UploadedFile>,
    ) -> Result<ServiceResponse, IngestError> {
        let params = ArtifactParams::parse(raw_params)?;
        self.check_job(job).await?;
        self.check_size(&params, artifacts_file).await?;

        if let Some(response) = self.check_existing(job, &params, artifacts_file).await? {
            return Ok(response);
        }

        let expire_at = self.resolve_expire_at(raw_params, &params)?;

        let mut staged = vec![Staged {
            file_type: params.artifact_type,
            file_format: params.artifact_format,
            upload: artifacts_file,
        }];
        if let Some(metadata_file) = metadata_file {
            staged.push(Staged {
                file_type: FileType::Metadata,
                file_format: FileFormat::Gzip,
                upload: metadata_file,
            });
        }

        let records = self.stage(job, &staged, expire_at).await?;
        let stored: Vec<StoredFile> = records.iter().map(|r| r.file.clone()).collect();

        match self.artifacts.create_artifacts(job.id, records, expire_at).await {
            Ok(created) => {
                info!(
                    job_id = %job.id,
                    file_type = %params.artifact_type,
                    count = created.len(),
                    expire_at = ?expire_at,
                    "created job artifacts"
                );
                Ok(ServiceResponse::success().with_artifacts(created.iter().map(|a| a.id).collect()))
            }
            Err(StoreError::UniqueViolation { .. }) => {
                // 並行アップロードに先を越された。勝った方のレコードで判定し直す
                self.discard(&stored).await;
                match self.check_existing(job, &params, artifacts_file).await? {
                    Some(response) => Ok(response),
                    None => Err(IngestError::Conflict),
                }
            }
            Err(err) => {
                self.discard(&stored).await;
                Err(store_error(err))
            }
        }
    }

    /// Reject uploads for jobs the artifact store does not know.
    async fn check_job(&self, job: &Job) -> Result<(), IngestError> {
        match self.artifacts.find_job(job.id).await.map_err(store_error)? {
            Some(_) => Ok(()),
            None => Err(store_error(StoreError::JobNotFound(job.id))),
        }
    }

    /// Reject the upload early when it exceeds the configured size limit.
    async fn check_size(
        &self,
        params: &ArtifactParams,
        artifacts_file: &UploadedFile,
    ) -> Result<(), IngestError> {
        let Some(limit) = self.settings.max_artifact_size(params.artifact_type) else {
            return Ok(());
        };
        let size = self
            .content
            .upload_size(artifacts_file)
            .await
            .map_err(IngestError::transient)?;
        if size > limit {
            debug!(size, limit, file_type = %params.artifact_type, "artifact exceeds size limit");
            return Err(IngestError::TooLarge);
        }
        Ok(())
    }

    /// `Some(success)` for a replay of the same content, `Err(Conflict)` for
    /// different content, `None` when nothing of this type exists yet.
    async fn check_existing(
        &self,
        job: &Job,
        params: &ArtifactParams,
        artifacts_file: &UploadedFile,
    ) -> Result<Option<ServiceResponse>, IngestError> {
        let existing = self
            .artifacts
            .find_by_job_and_type(job.id, params.artifact_type)
            .await
            .map_err(store_error)?;

        match existing {
            None => Ok(None),
            Some(existing) if existing.file_sha256 == *artifacts_file.sha256() => {
                debug!(
                    job_id = %job.id,
                    file_type = %params.artifact_type,
                    artifact_id = %existing.id,
                    "artifact already ingested, ignoring upload"
                );
                Ok(Some(ServiceResponse::success()))
            }
            Some(existing) => {
                warn!(
                    job_id = %job.id,
                    file_type = %params.artifact_type,
                    existing_sha256 = %existing.file_sha256,
                    uploaded_sha256 = %artifacts_file.sha256(),
                    "another artifact of the same type already exists"
                );
                Err(IngestError::Conflict)
            }
        }
    }

    /// `expire_in` param, else the application default, else never.
    ///
    /// A deadline past the representable date range is rejected instead of
    /// turning into "never".
    fn resolve_expire_at(
        &self,
        raw_params: &RawArtifactParams,
        params: &ArtifactParams,
    ) -> Result<Option<DateTime<Utc>>, IngestError> {
        let now = self.clock.now();
        let resolved = match params.expire_in {
            Some(expire_in) => {
                let source = raw_params.expire_in.clone().unwrap_or_default();
                Some((expire_in, source))
            }
            None => self.default_expire_in(),
        };
        let Some((expire_in, source)) = resolved else {
            return Ok(None);
        };
        expire_in.deadline_from(now).map_err(|_| {
            IngestError::Params(ParamsError::ExpireIn(ExpireInError::OutOfRange(
                source.trim().to_string(),
            )))
        })
    }

    fn default_expire_in(&self) -> Option<(ExpireIn, String)> {
        let default = self.settings.default_artifacts_expire_in()?;
        match ExpireIn::parse(&default) {
            Ok(expire_in) => Some((expire_in, default)),
            Err(err) => {
                warn!(default = %default, error = %err, "ignoring invalid default_artifacts_expire_in");
                None
            }
        }
    }

    /// Write every staged file to the content store, in order.
    ///
    /// On the first failure everything written so far is removed again.
    async fn stage(
        &self,
        job: &Job,
        staged: &[Staged<'_>],
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<JobArtifact>, IngestError> {
        let created_at = self.clock.now();
        let mut records: Vec<JobArtifact> = Vec::with_capacity(staged.len());

        for item in staged {
            let id = self.ids.generate_artifact_id();
            let key = storage_key(job, &id.to_string(), &item.upload.filename());

            let file = match self.content.store(&key, item.upload).await {
                Ok(file) => file,
                Err(err) => {
                    self.discard_records(&records).await;
                    return Err(IngestError::transient(err));
                }
            };

            if self.settings.verify_sha256() && file.sha256 != *item.upload.sha256() {
                warn!(
                    job_id = %job.id,
                    file_type = %item.file_type,
                    declared = %item.upload.sha256(),
                    computed = %file.sha256,
                    "uploaded content does not match declared sha256"
                );
                self.discard(std::slice::from_ref(&file)).await;
                self.discard_records(&records).await;
                return Err(IngestError::ChecksumMismatch);
            }

            records.push(JobArtifact {
                id,
                job_id: job.id,
                project_id: job.project_id,
                file_type: item.file_type,
                file_format: item.file_format,
                file_sha256: item.upload.sha256().clone(),
                file,
                expire_at,
                created_at,
            });
        }

        Ok(records)
    }

    async fn discard_records(&self, records: &[JobArtifact]) {
        let files: Vec<StoredFile> = records.iter().map(|r| r.file.clone()).collect();
        self.discard(&files).await;
    }

    /// Best-effort removal of staged content; failures are only logged.
    async fn discard(&self, files: &[StoredFile]) {
        for file in files {
            if let Err(err) = self.content.delete(&file.key).await {
                warn!(key = %file.key, error = %err, "failed to remove staged artifact content");
            }
        }
    }
}

/// Missing jobs and projects are caller errors; everything else is retried.
fn store_error(err: StoreError) -> IngestError {
    match err {
        StoreError::JobNotFound(_) | StoreError::ProjectNotFound(_) => {
            IngestError::NotFound(err.to_string())
        }
        other => IngestError::transient(other),
    }
}

fn tracking_context(job: &Job, params: &RawArtifactParams) -> TrackingContext {
    let mut context = TrackingContext::new();
    context.insert("job_id", job.id.to_string());
    context.insert("project_id", job.project_id.to_string());
    if let Some(artifact_type) = &params.artifact_type {
        context.insert("artifact_type", artifact_type.clone());
    }
    context
}

/// `<project>/<job>/<artifact>/<filename>` with the filename reduced to a
/// single safe path component.
fn storage_key(job: &Job, artifact_id: &str, filename: &str) -> String {
    let mut name: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() || name.chars().all(|c| c == '.') {
        name = "artifact".to_string();
    }
    format!("{}/{}/{}/{}", job.project_id, job.id, artifact_id, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{IdGenerator, SystemClock, UlidGenerator};

    fn job() -> Job {
        let ids = UlidGenerator::new(SystemClock);
        Job::new(ids.generate_job_id(), ids.generate_project_id(), "build")
    }

    #[test]
    fn storage_key_layout() {
        let job = job();
        let key = storage_key(&job, "artifact-1", "ci_build_artifacts.zip");
        assert_eq!(
            key,
            format!("{}/{}/artifact-1/ci_build_artifacts.zip", job.project_id, job.id)
        );
    }

    #[test]
    fn storage_key_sanitizes_filename() {
        let job = job();
        assert!(storage_key(&job, "a", "../../etc/passwd").ends_with("/a/.._.._etc_passwd"));
        assert!(storage_key(&job, "a", "..").ends_with("/a/artifact"));
        assert!(storage_key(&job, "a", "").ends_with("/a/artifact"));
    }

    #[test]
    fn missing_job_maps_to_not_found() {
        let job = job();
        let err = store_error(StoreError::JobNotFound(job.id));
        assert!(matches!(err, IngestError::NotFound(_)));
        assert!(matches!(
            store_error(StoreError::Backend("connection reset".to_string())),
            IngestError::Transient(_)
        ));
    }

    #[test]
    fn tracking_context_names_job_and_type() {
        let job = job();
        let context = tracking_context(&job, &RawArtifactParams::new("archive", "zip"));
        assert_eq!(context.get("job_id"), Some(&job.id.to_string()));
        assert_eq!(context.get("artifact_type").map(String::as_str), Some("archive"));
    }
}
