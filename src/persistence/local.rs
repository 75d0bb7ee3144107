//! Guest-mode storage: a string key/value file standing in for browser local
//! storage. The whole hatim list lives as one serialized value under
//! [`LOCAL_HATIMS_KEY`] and is read and rewritten wholesale on every call.

use super::PersistenceResult;
use crate::hatim::{Hatim, HatimId, HatimPatch};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const LOCAL_HATIMS_KEY: &str = "hatims";

enum Backing {
    File(PathBuf),
    Memory(Mutex<BTreeMap<String, String>>),
}

pub struct LocalStorage {
    backing: Backing,
}

impl LocalStorage {
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            backing: Backing::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backing: Backing::Memory(Mutex::new(BTreeMap::new())),
        }
    }

    pub fn get_item(&self, key: &str) -> PersistenceResult<Option<String>> {
        match &self.backing {
            Backing::File(path) => Ok(read_entries(path)?.remove(key)),
            Backing::Memory(entries) => Ok(entries.lock().get(key).cloned()),
        }
    }

    pub fn set_item(&self, key: &str, value: String) -> PersistenceResult<()> {
        match &self.backing {
            Backing::File(path) => {
                let mut entries = read_entries(path)?;
                entries.insert(key.to_string(), value);
                write_entries(path, &entries)
            }
            Backing::Memory(entries) => {
                entries.lock().insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    pub fn remove_item(&self, key: &str) -> PersistenceResult<()> {
        match &self.backing {
            Backing::File(path) => {
                let mut entries = read_entries(path)?;
                if entries.remove(key).is_some() {
                    write_entries(path, &entries)?;
                }
                Ok(())
            }
            Backing::Memory(entries) => {
                entries.lock().remove(key);
                Ok(())
            }
        }
    }
}

fn read_entries(path: &Path) -> PersistenceResult<BTreeMap<String, String>> {
    match File::open(path) {
        Ok(file) => Ok(serde_json::from_reader(file)?),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(err) => Err(err.into()),
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> PersistenceResult<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };
    // the previous file stays intact until the new one is complete
    let mut staged = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(staged.as_file_mut(), entries)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// The guest hatim list on top of [`LocalStorage`].
pub struct LocalHatims {
    storage: LocalStorage,
}

impl LocalHatims {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> PersistenceResult<Vec<Hatim>> {
        match self.storage.get_item(LOCAL_HATIMS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    pub fn get(&self, id: &HatimId) -> PersistenceResult<Option<Hatim>> {
        Ok(self.list()?.into_iter().find(|h| &h.id == id))
    }

    /// New records go first, matching the display order.
    pub fn insert(&self, hatim: &Hatim) -> PersistenceResult<()> {
        let mut hatims = self.list()?;
        hatims.insert(0, hatim.clone());
        self.save(&hatims)
    }

    pub fn update(&self, id: &HatimId, patch: &HatimPatch) -> PersistenceResult<()> {
        let mut hatims = self.list()?;
        let Some(hatim) = hatims.iter_mut().find(|h| &h.id == id) else {
            return Ok(());
        };
        hatim.apply(patch);
        self.save(&hatims)
    }

    pub fn delete(&self, id: &HatimId) -> PersistenceResult<()> {
        let mut hatims = self.list()?;
        let before = hatims.len();
        hatims.retain(|h| &h.id != id);
        if hatims.len() == before {
            return Ok(());
        }
        self.save(&hatims)
    }

    pub fn clear(&self) -> PersistenceResult<()> {
        self.storage.remove_item(LOCAL_HATIMS_KEY)
    }

    fn save(&self, hatims: &[Hatim]) -> PersistenceResult<()> {
        self.storage
            .set_item(LOCAL_HATIMS_KEY, serde_json::to_string(hatims)?)
    }
}
