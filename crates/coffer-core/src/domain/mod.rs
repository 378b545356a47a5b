//! Domain model (ids, jobs, artifacts, parameters, responses, errors).
//!
//! ストレージや HTTP を前提にしない純粋なモデルだけを置きます。

pub mod artifact;
pub mod errors;
pub mod expire_in;
pub mod ids;
pub mod job;
pub mod outcome;
pub mod params;
pub mod upload;

pub use artifact::{
    DigestError, FileFormat, FileType, JobArtifact, Sha256Digest, StoredFile, UnknownVariant,
};
pub use errors::{ErrorKind, IngestError};
pub use expire_in::{ExpireIn, ExpireInError};
pub use ids::{ArtifactId, JobId, ProjectId};
pub use job::{Job, Project};
pub use outcome::{HttpStatus, ServiceResponse, Status};
pub use params::{ArtifactParams, ParamsError, RawArtifactParams};
pub use upload::UploadedFile;
