//! Error taxonomy for a single fetch run
//!
//! Every variant is terminal. Remote errors are classified from the HTTP
//! status at the call site; everything else from the underlying error value.

use reqwest::StatusCode;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which API call produced a remote error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteTarget {
    Repository,
    Asset,
}

impl fmt::Display for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteTarget::Repository => write!(f, "repository"),
            RemoteTarget::Asset => write!(f, "asset"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("access to {target} denied by {url}: {status}")]
    RemoteAuth {
        target: RemoteTarget,
        url: String,
        status: StatusCode,
    },

    #[error("{target} not found: {url}")]
    RemoteNotFound { target: RemoteTarget, url: String },

    #[error("request to {url} failed: {reason}")]
    RemoteUnavailable { url: String, reason: String },

    #[error("no releases created in repo '{repo}'")]
    NoReleases { repo: String },

    #[error("{}", no_matching_release_message(.repo, .selector, .file.as_deref()))]
    NoMatchingRelease {
        repo: String,
        /// Either the bare prefix (latest) or prefix + version
        selector: String,
        /// Set when candidate releases existed but none carried a matching asset
        file: Option<String>,
    },

    #[error("could not find an asset matching the file name '{file}' in '{repo}'")]
    NoMatchingAsset { repo: String, file: String },

    #[error("could not prepare {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write {}: {reason}", .path.display())]
    Transfer { path: PathBuf, reason: String },

    #[error("could not unpack {}: {reason}", .path.display())]
    Unpack { path: PathBuf, reason: String },
}

fn no_matching_release_message(repo: &str, selector: &str, file: Option<&str>) -> String {
    match file {
        Some(file) => format!(
            "could not find a release with the prefix/version '{}' and an asset matching the file name '{}' in '{}'",
            selector, file, repo
        ),
        None => format!(
            "could not find a release with the prefix/version '{}' in '{}'",
            selector, repo
        ),
    }
}

impl FetchError {
    /// Classify a non-success HTTP status returned by `url`.
    pub fn from_status(target: RemoteTarget, url: &str, status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::RemoteAuth {
                target,
                url: url.to_string(),
                status,
            },
            StatusCode::NOT_FOUND => FetchError::RemoteNotFound {
                target,
                url: url.to_string(),
            },
            _ => FetchError::RemoteUnavailable {
                url: url.to_string(),
                reason: status.to_string(),
            },
        }
    }

    /// Supplementary advice emitted ahead of the failure message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FetchError::RemoteAuth { .. } => Some(
                "looks like the provided token has no access to the repository, verify its scope",
            ),
            FetchError::RemoteNotFound {
                target: RemoteTarget::Repository,
                ..
            } => Some(
                "could not find the repository, check the spelling of the repo or the access of the auth token",
            ),
            FetchError::RemoteNotFound {
                target: RemoteTarget::Asset,
                ..
            } => Some(
                "could not find the asset, check the spelling of the file name or the access of the auth token",
            ),
            _ => None,
        }
    }
}
