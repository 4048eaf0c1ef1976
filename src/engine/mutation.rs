//! Mutation requests applied by the executors.

use crate::domain::{Metadata, OperationKind, TAGS_KEY};
use crate::engine::EngineError;
use serde::{Deserialize, Serialize};

/// One change to apply to every target of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Adds tags as a set union; `extra` fields are written on top.
    MergeTags {
        tags: Vec<String>,
        #[serde(default)]
        extra: Metadata,
    },
    /// Overwrites the given fields; other fields are kept.
    OverwriteMetadata { fields: Metadata },
    /// Moves each note into a folder, keeping its file name.
    Relocate {
        destination_folder: String,
        #[serde(default)]
        create_folders: bool,
    },
    Create {
        body: String,
        #[serde(default)]
        metadata: Option<Metadata>,
        #[serde(default)]
        overwrite: bool,
        #[serde(default)]
        create_folders: bool,
    },
    /// Replaces the body; metadata is replaced only when given.
    Update {
        body: String,
        #[serde(default)]
        metadata: Option<Metadata>,
    },
    Append { text: String },
    DeleteNote,
    DeleteFolder {
        #[serde(default)]
        recursive: bool,
    },
    CreateFolder {
        #[serde(default)]
        exist_ok: bool,
    },
    /// Moves a folder subtree to a new path.
    MoveFolder { destination: String },
}

impl Mutation {
    pub fn merge_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Mutation::MergeTags {
            tags: tags.into_iter().map(Into::into).collect(),
            extra: Metadata::new(),
        }
    }

    pub fn relocate(destination_folder: impl Into<String>, create_folders: bool) -> Self {
        Mutation::Relocate {
            destination_folder: destination_folder.into(),
            create_folders,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Mutation::MergeTags { .. } => OperationKind::TagMerge,
            Mutation::OverwriteMetadata { .. } => OperationKind::MetadataOverwrite,
            Mutation::Relocate { .. } => OperationKind::Relocate,
            Mutation::Create { .. } => OperationKind::Create,
            Mutation::Update { .. } => OperationKind::Update,
            Mutation::Append { .. } => OperationKind::Append,
            Mutation::DeleteNote => OperationKind::DeleteNote,
            Mutation::DeleteFolder { .. } => OperationKind::DeleteFolder,
            Mutation::CreateFolder { .. } => OperationKind::CreateFolder,
            Mutation::MoveFolder { .. } => OperationKind::MoveFolder,
        }
    }

    /// Checks required parameters before any store call.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` naming the missing parameter.
    pub fn validate(&self) -> Result<(), EngineError> {
        match self {
            Mutation::MergeTags { tags, .. } if tags.iter().all(|t| t.trim().is_empty()) => {
                Err(EngineError::Validation("tags must not be empty".into()))
            }
            Mutation::MergeTags { extra, .. } if extra.contains_key(TAGS_KEY) => Err(
                EngineError::Validation("extra fields cannot set 'tags'; pass them as tags".into()),
            ),
            Mutation::OverwriteMetadata { fields } if fields.is_empty() => Err(
                EngineError::Validation("metadata fields must not be empty".into()),
            ),
            Mutation::Relocate {
                destination_folder, ..
            } if destination_folder.trim().is_empty() => Err(EngineError::Validation(
                "destination folder is required".into(),
            )),
            Mutation::MoveFolder { destination } if destination.trim().is_empty() => Err(
                EngineError::Validation("destination folder is required".into()),
            ),
            Mutation::Append { text } if text.is_empty() => {
                Err(EngineError::Validation("text to append must not be empty".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Caller switches that apply to a whole batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Must be set for destructive operations to touch the store.
    pub confirm_destructive: bool,
}

impl ExecOptions {
    pub fn confirmed() -> Self {
        Self {
            confirm_destructive: true,
        }
    }
}
