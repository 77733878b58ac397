use std::path::PathBuf;

use thiserror::Error;

/// A reload failed; the previously installed data stays authoritative.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported data format version {0} (only version 2 is supported)")]
    UnsupportedVersion(u32),

    #[error("{origin}: missing required field `{field}`")]
    MissingField { origin: String, field: String },

    #[error("{origin}: field `{field}` must be {expected}")]
    InvalidField {
        origin: String,
        field: String,
        expected: &'static str,
    },

    #[error("{origin}: unknown {kind} `{slug}`")]
    UnknownReference {
        origin: String,
        kind: &'static str,
        slug: String,
    },

    #[error("Duplicate venue slug: {0}")]
    DuplicateVenue(String),

    #[error("{origin}: invalid recurrence rule `{rule}`: {reason}")]
    InvalidRecurrence {
        origin: String,
        rule: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// The built object graph does not match its declared schema.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{path}: {value} is not {expected}")]
    TypeMismatch {
        path: String,
        value: String,
        expected: String,
    },

    #[error("{path}: object has undeclared attributes: {names:?}")]
    UndeclaredAttributes { path: String, names: Vec<String> },

    #[error("{path}: declared attribute `{name}` is missing")]
    MissingAttribute { path: String, name: String },

    #[error("{path}: dangling reference to {entity} #{index}")]
    DanglingReference {
        path: String,
        entity: &'static str,
        index: usize,
    },

    #[error("{path}: {value} is not in the {expected} timezone")]
    WrongTimezone {
        path: String,
        value: String,
        expected: String,
    },
}
