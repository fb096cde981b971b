//! Error types for weekcal.

use std::path::PathBuf;

use thiserror::Error;

use crate::form::Field;

/// The token endpoint refused to issue a new access token, or could not be reached.
///
/// Recoverable: the stored credentials are left untouched, so the caller can
/// retry or re-run the browser authorization flow.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token endpoint rejected the refresh ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to persist refreshed token: {0}")]
    Persist(#[from] ConfigError),
}

/// Errors from the Calendar API client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Calendar API returned 401 Unauthorized")]
    Unauthorized,

    #[error("Calendar API rejected the request ({status}): {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("Calendar API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed timestamp in remote event: {value:?}")]
    MalformedTimestamp { value: String },

    #[error("Event has no identifier")]
    MissingEventId,

    #[error("Week count must be a positive integer, got {0}")]
    InvalidWindow(i64),
}

/// Form fields that failed validation on submit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid fields: {fields:?}")]
pub struct ValidationError {
    pub fields: Vec<Field>,
}

/// Problems with the credentials file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// The file did not exist; a template was written in its place.
    #[error(
        "Created a new config at {0}\n\
        Fill in your Google OAuth client id/secret and calendar id, \
        then run `weekcal --auth` to authorize."
    )]
    Created(PathBuf),

    #[error("Config {path} is missing required key {key}")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("Config {path} has an invalid value for {key}: {value:?}")]
    InvalidValue {
        path: PathBuf,
        key: &'static str,
        value: String,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any failure from a credentialed calendar operation.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
