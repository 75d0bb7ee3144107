use crate::auth::SessionUser;
use crate::hatim::{Hatim, HatimId, HatimPatch, NewHatim};
use crate::participant::Participant;
use crate::persistence::{HatimRepository, LocalHatims, PersistenceError, PersistenceResult};
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("hatim {0} not found")]
    NotFound(HatimId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The in-memory hatim list of one session, kept most-recent-first.
///
/// Signed-in sessions read from the remote repository; guest sessions read
/// local storage. Individual records are routed by their [`HatimId`] variant
/// no matter which session is active.
pub struct HatimStore {
    hatims: Vec<Hatim>,
    remote: Arc<dyn HatimRepository>,
    local: LocalHatims,
    session: Option<SessionUser>,
}

impl HatimStore {
    pub fn new(remote: Arc<dyn HatimRepository>, local: LocalHatims) -> Self {
        Self {
            hatims: Vec::new(),
            remote,
            local,
            session: None,
        }
    }

    /// Switches to `user` (or guest mode) and drops the previous session's list.
    pub fn begin_session(&mut self, user: Option<SessionUser>) {
        self.hatims.clear();
        self.session = user;
    }

    pub fn reset(&mut self) {
        self.begin_session(None);
    }

    pub fn session(&self) -> Option<&SessionUser> {
        self.session.as_ref()
    }

    pub fn hatims(&self) -> &[Hatim] {
        &self.hatims
    }

    pub fn get(&self, id: &HatimId) -> Option<&Hatim> {
        self.hatims.iter().find(|h| &h.id == id)
    }

    /// Replaces the list from the session's source. Failures are logged and
    /// leave the current list untouched.
    pub fn load_all(&mut self) -> &[Hatim] {
        let loaded = match &self.session {
            Some(user) => self.remote.list_by_owner(&user.id),
            None => self.local.list(),
        };
        match loaded {
            Ok(hatims) => {
                info!(count = hatims.len(), guest = self.session.is_none(), "loaded hatims");
                self.hatims = hatims;
            }
            Err(err) => error!(error = %err, "failed to load hatims"),
        }
        &self.hatims
    }

    /// Fetches one record from its owner. Needs no session, so shared links work.
    pub fn load(&self, id: &HatimId) -> Option<Hatim> {
        match self.fetch(id) {
            Ok(found) => found,
            Err(err) => {
                error!(hatim_id = %id, error = %err, "failed to load hatim");
                None
            }
        }
    }

    pub fn create(&mut self, name: &str) -> StoreResult<HatimId> {
        let draft = NewHatim::named(name, self.session.as_ref().map(|u| u.id.clone()));
        let created = match &self.session {
            Some(_) => self.remote.insert(&draft),
            None => {
                let hatim = draft.into_hatim(HatimId::new_local());
                self.local.insert(&hatim).map(|()| hatim)
            }
        };
        let hatim = created.inspect_err(|err| {
            error!(error = %err, "failed to create hatim");
        })?;

        let id = hatim.id.clone();
        info!(hatim_id = %id, "created hatim");
        self.hatims.insert(0, hatim);
        Ok(id)
    }

    /// Validates `patch` against the current record, then merges it locally
    /// before persisting it. If persisting fails the local record is restored
    /// and the error returned.
    pub fn update(&mut self, id: &HatimId, patch: HatimPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let (start, end) = match self.get(id) {
            Some(hatim) => (hatim.start_date, hatim.end_date),
            None => self
                .fetch(id)
                .ok()
                .flatten()
                .map_or((None, None), |hatim| (hatim.start_date, hatim.end_date)),
        };
        validation::validate_patch(&patch, start, end).inspect_err(|err| {
            warn!(hatim_id = %id, error = %err, "rejected hatim update");
        })?;

        let previous = self.position(id).map(|idx| {
            let before = self.hatims[idx].clone();
            self.hatims[idx].apply(&patch);
            (idx, before)
        });

        if let Err(err) = self.persist_update(id, &patch) {
            error!(hatim_id = %id, error = %err, "failed to update hatim; reverting");
            if let Some((idx, before)) = previous {
                self.hatims[idx] = before;
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Removes the record from its owner, then from the list. Unknown ids are fine.
    pub fn delete(&mut self, id: &HatimId) -> StoreResult<()> {
        let removed = match id {
            HatimId::Remote(raw) => self.remote.delete(raw),
            HatimId::Local(_) => self.local.delete(id),
        };
        if let Err(err) = removed {
            error!(hatim_id = %id, error = %err, "failed to delete hatim");
            return Err(err.into());
        }
        self.hatims.retain(|h| &h.id != id);
        info!(hatim_id = %id, "deleted hatim");
        Ok(())
    }

    pub fn add_participant(&mut self, id: &HatimId, participant: Participant) -> StoreResult<()> {
        self.edit_participants(id, |hatim| hatim.add_participant(participant))
    }

    pub fn update_participant(
        &mut self,
        id: &HatimId,
        index: usize,
        full_name: &str,
        pages: u32,
    ) -> StoreResult<()> {
        self.edit_participants(id, |hatim| hatim.update_participant(index, full_name, pages))
    }

    pub fn remove_participant(&mut self, id: &HatimId, index: usize) -> StoreResult<Participant> {
        self.edit_participants(id, |hatim| hatim.remove_participant(index))
    }

    pub fn move_participant(&mut self, id: &HatimId, from: usize, to: usize) -> StoreResult<()> {
        self.edit_participants(id, |hatim| hatim.move_participant(from, to))
    }

    /// Marks or unmarks a day as read; returns the new mark.
    pub fn toggle_checked_day(
        &mut self,
        id: &HatimId,
        index: usize,
        date: NaiveDate,
    ) -> StoreResult<bool> {
        self.edit_participants(id, |hatim| hatim.toggle_checked_day(index, date))
    }

    fn edit_participants<T, F>(&mut self, id: &HatimId, edit: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Hatim) -> Result<T, ValidationError>,
    {
        let mut hatim = match self.get(id) {
            Some(hatim) => hatim.clone(),
            None => self.fetch(id)?.ok_or_else(|| {
                warn!(hatim_id = %id, "participant edit on unknown hatim");
                StoreError::NotFound(id.clone())
            })?,
        };
        let output = edit(&mut hatim)?;
        self.update(id, HatimPatch::participants(hatim.participants))?;
        Ok(output)
    }

    fn position(&self, id: &HatimId) -> Option<usize> {
        self.hatims.iter().position(|h| &h.id == id)
    }

    fn fetch(&self, id: &HatimId) -> PersistenceResult<Option<Hatim>> {
        match id {
            HatimId::Remote(raw) => self.remote.get_by_id(raw),
            HatimId::Local(_) => self.local.get(id),
        }
    }

    fn persist_update(&self, id: &HatimId, patch: &HatimPatch) -> PersistenceResult<()> {
        match id {
            HatimId::Remote(raw) => self.remote.update(raw, patch),
            HatimId::Local(_) => self.local.update(id, patch),
        }
    }
}
