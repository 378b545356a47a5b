//! Request parameters of an artifact upload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::artifact::{FileFormat, FileType, UnknownVariant};
use super::expire_in::{ExpireIn, ExpireInError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamsError {
    #[error("missing parameter: {0}")]
    Missing(&'static str),

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),

    #[error(transparent)]
    ExpireIn(#[from] ExpireInError),
}

/// Raw parameters as forwarded by the upload endpoint.
///
/// Kept as strings so the caller does not have to validate anything; parsing
/// happens in [`ArtifactParams::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArtifactParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_in: Option<String>,
}

impl RawArtifactParams {
    pub fn new(artifact_type: impl Into<String>, artifact_format: impl Into<String>) -> Self {
        Self {
            artifact_type: Some(artifact_type.into()),
            artifact_format: Some(artifact_format.into()),
            expire_in: None,
        }
    }

    pub fn with_expire_in(mut self, expire_in: impl Into<String>) -> Self {
        self.expire_in = Some(expire_in.into());
        self
    }

    /// Build from a request parameter map. Unrecognized keys are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            artifact_type: map.get("artifact_type").cloned(),
            artifact_format: map.get("artifact_format").cloned(),
            expire_in: map.get("expire_in").cloned(),
        }
    }
}

/// Validated upload parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactParams {
    pub artifact_type: FileType,
    pub artifact_format: FileFormat,
    pub expire_in: Option<ExpireIn>,
}

impl ArtifactParams {
    pub fn parse(raw: &RawArtifactParams) -> Result<Self, ParamsError> {
        let artifact_type = raw
            .artifact_type
            .as_deref()
            .ok_or(ParamsError::Missing("artifact_type"))?
            .parse::<FileType>()?;
        let artifact_format = raw
            .artifact_format
            .as_deref()
            .ok_or(ParamsError::Missing("artifact_format"))?
            .parse::<FileFormat>()?;
        // an empty expire_in is treated as absent, like an omitted form field
        let expire_in = raw
            .expire_in
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(ExpireIn::parse)
            .transpose()?;

        Ok(Self {
            artifact_type,
            artifact_format,
            expire_in,
        })
    }
}
