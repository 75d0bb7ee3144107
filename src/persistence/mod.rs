use crate::hatim::{Hatim, HatimPatch, NewHatim};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// The remote row store holding authenticated users' hatims.
///
/// Ids passed here are bare remote ids; routing between this store and local
/// storage happens in [`crate::store::HatimStore`].
pub trait HatimRepository: Send + Sync {
    /// Most recently created first.
    fn list_by_owner(&self, owner: &str) -> PersistenceResult<Vec<Hatim>>;
    fn get_by_id(&self, id: &str) -> PersistenceResult<Option<Hatim>>;
    /// Stores the record and returns it with its assigned id.
    fn insert(&self, hatim: &NewHatim) -> PersistenceResult<Hatim>;
    /// Updating an unknown id is a no-op.
    fn update(&self, id: &str, patch: &HatimPatch) -> PersistenceResult<()>;
    /// Deleting an unknown id is a no-op.
    fn delete(&self, id: &str) -> PersistenceResult<()>;
}

pub mod local;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use local::{LOCAL_HATIMS_KEY, LocalHatims, LocalStorage};
