//! Error types for collecting items.

use std::path::PathBuf;

use thiserror::Error;

use crate::repository::{ContainerId, ItemId};

/// Failures reported by a [`Repository`](crate::repository::Repository) backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found in repository")]
    ItemNotFound(ItemId),

    #[error("{0} not found in repository")]
    ContainerNotFound(ContainerId),

    #[error("An entry named '{name}' already exists in the destination")]
    AlreadyExists { name: String },

    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The repository as a whole can no longer be written to.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Fatal errors abort the whole move batch instead of a single item.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors that abort a collect run before anything is moved.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("No item names entered")]
    NoNames,

    #[error("Destination path is empty. Either disable the destination or provide a path")]
    EmptyDestination,

    #[error("Destination path not found: \"{0}\". Enable creating the destination path or adjust the path")]
    DestinationNotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Confirmation failed: {0}")]
    Prompt(#[source] anyhow::Error),
}
