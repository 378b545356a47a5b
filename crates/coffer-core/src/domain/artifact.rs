//! Job artifact model: file types, formats, digests and the persisted record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ArtifactId, JobId, ProjectId};

/// Kind of artifact a job can produce.
///
/// The pair (job, file type) is unique: a job owns at most one artifact of
/// each type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Archive,
    Metadata,
    Trace,
    Junit,
    Codequality,
    Sast,
    DependencyScanning,
    ContainerScanning,
    Dast,
    LicenseManagement,
    Performance,
    Metrics,
    Dotenv,
}

impl FileType {
    pub const ALL: [FileType; 13] = [
        FileType::Archive,
        FileType::Metadata,
        FileType::Trace,
        FileType::Junit,
        FileType::Codequality,
        FileType::Sast,
        FileType::DependencyScanning,
        FileType::ContainerScanning,
        FileType::Dast,
        FileType::LicenseManagement,
        FileType::Performance,
        FileType::Metrics,
        FileType::Dotenv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Archive => "archive",
            FileType::Metadata => "metadata",
            FileType::Trace => "trace",
            FileType::Junit => "junit",
            FileType::Codequality => "codequality",
            FileType::Sast => "sast",
            FileType::DependencyScanning => "dependency_scanning",
            FileType::ContainerScanning => "container_scanning",
            FileType::Dast => "dast",
            FileType::LicenseManagement => "license_management",
            FileType::Performance => "performance",
            FileType::Metrics => "metrics",
            FileType::Dotenv => "dotenv",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known enum value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for FileType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "artifact_type",
                value: s.to_string(),
            })
    }
}

/// Storage/codec format tag of an artifact file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Raw,
    Zip,
    Gzip,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Raw => "raw",
            FileFormat::Zip => "zip",
            FileFormat::Gzip => "gzip",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(FileFormat::Raw),
            "zip" => Ok(FileFormat::Zip),
            "gzip" => Ok(FileFormat::Gzip),
            other => Err(UnknownVariant {
                kind: "artifact_format",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    #[error("sha256 must be 64 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("sha256 contains a non-hex character")]
    InvalidCharacter,
}

/// A SHA-256 content digest, kept as 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha256Digest(String);

impl Sha256Digest {
    pub fn parse(value: &str) -> Result<Self, DigestError> {
        if value.len() != 64 {
            return Err(DigestError::InvalidLength(value.len()));
        }
        if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DigestError::InvalidCharacter);
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DigestError> {
        Self::parse(&hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Sha256Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Sha256Digest> for String {
    fn from(digest: Sha256Digest) -> Self {
        digest.0
    }
}

/// Reference to content persisted by a content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Store-relative key of the content.
    pub key: String,

    pub size: u64,

    /// Digest computed while the content was written.
    pub sha256: Sha256Digest,
}

/// A persisted job artifact.
///
/// `project_id` is denormalized from the job for query convenience. Records
/// are never updated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobArtifact {
    pub id: ArtifactId,
    pub job_id: JobId,
    pub project_id: ProjectId,
    pub file_type: FileType,
    pub file_format: FileFormat,

    /// Digest declared by the uploader.
    pub file_sha256: Sha256Digest,
    pub file: StoredFile,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JobArtifact {
    pub fn size(&self) -> u64 {
        self.file.size
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.is_some_and(|at| at <= now)
    }
}
