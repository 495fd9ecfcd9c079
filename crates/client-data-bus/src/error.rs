//! Errors returned by bus connections.

use crate::{AreaId, DefinitionId};
use thiserror::Error;

/// Errors from client-data operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("Definition {0} is already registered on this connection")]
    DuplicateDefinition(DefinitionId),

    #[error("Definition {0} is not registered on this connection")]
    UnknownDefinition(DefinitionId),

    #[error("Area id {0} is not mapped on this connection")]
    UnknownArea(AreaId),

    #[error("Area id {id} is already mapped to {existing}")]
    AreaIdInUse { id: AreaId, existing: String },

    #[error("Area {name} was created with size {existing}, not {requested}")]
    AreaSizeMismatch {
        name: String,
        existing: usize,
        requested: usize,
    },

    #[error("Data is {actual} bytes but definition {definition} expects {expected}")]
    DataSizeMismatch {
        definition: DefinitionId,
        expected: usize,
        actual: usize,
    },

    #[error("Definition size must be non-zero")]
    EmptyDefinition,
}
