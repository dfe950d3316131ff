//! Keeps the in-memory settings and the settings file in step.
//!
//! Two halves share one struct because they share the self-write signal:
//!
//! * debounce: local edits mark the state dirty; the file is written once the
//!   edits have been quiet for [`DEBOUNCE`].
//! * change detection: every tick stats the file. A new mtime that this
//!   process did not cause reloads the file wholesale, dropping unsaved local
//!   edits (last writer wins).

use std::time::{Duration, Instant, SystemTime};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::ConfigStore;
use crate::settings::Settings;

pub const DEBOUNCE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Unchanged,
    /// The mtime moved because of our own save.
    OwnWrite,
    /// Someone else edited the file; these settings replace the current ones.
    Reloaded(Settings),
}

#[derive(Debug)]
pub struct ConfigSync {
    store: ConfigStore,
    last_mtime: Option<SystemTime>,
    dirty: bool,
    last_change: Option<Instant>,
    just_saved: bool,
}

impl ConfigSync {
    /// Load the file over the defaults, or create it if it does not exist yet.
    pub fn open(store: ConfigStore) -> (Self, Settings) {
        let defaults = Settings::default();
        let settings = if store.exists() {
            let loaded = store.load(&defaults);
            info!(path = %store.path().display(), "loaded settings");
            if !loaded.help_present {
                debug!("help block missing, it will be appended on the next save");
            }
            loaded.settings
        } else {
            match store.save(&defaults) {
                Ok(()) => info!(path = %store.path().display(), "created settings file"),
                Err(e) => warn!("could not create settings file: {e:#}"),
            }
            defaults
        };

        let sync = Self {
            last_mtime: store.modified(),
            store,
            dirty: false,
            last_change: None,
            just_saved: false,
        };
        (sync, settings)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
    }

    /// Write `settings` now. On success the state is clean and the next poll
    /// will not mistake this write for an external edit.
    pub fn save(&mut self, settings: &Settings) -> Result<()> {
        self.store.save(settings)?;
        self.dirty = false;
        self.just_saved = true;
        if let Some(mtime) = self.store.modified() {
            self.last_mtime = Some(mtime);
        }
        debug!("settings saved");
        Ok(())
    }

    /// Save if dirty and the last edit is at least [`DEBOUNCE`] old.
    /// Returns whether a write happened. A failed write is retried one
    /// debounce interval later.
    pub fn flush_if_due(&mut self, settings: &Settings, now: Instant) -> Result<bool> {
        let due = self
            .last_change
            .is_none_or(|at| now.saturating_duration_since(at) >= DEBOUNCE);
        if !self.dirty || !due {
            return Ok(false);
        }
        match self.save(settings) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.last_change = Some(now);
                Err(e)
            }
        }
    }

    /// Unconditional save-if-dirty, used on quit.
    pub fn flush(&mut self, settings: &Settings) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.save(settings).map(|()| true)
    }

    /// One metadata stat. See [`PollOutcome`].
    pub fn poll(&mut self, current: &Settings) -> PollOutcome {
        let Some(mtime) = self.store.modified() else {
            return PollOutcome::Unchanged;
        };
        if self.last_mtime == Some(mtime) {
            self.just_saved = false;
            return PollOutcome::Unchanged;
        }

        self.last_mtime = Some(mtime);
        if std::mem::take(&mut self.just_saved) {
            return PollOutcome::OwnWrite;
        }

        info!(path = %self.store.path().display(), "settings file changed externally, reloading");
        let loaded = self.store.load(current);
        self.dirty = false;
        PollOutcome::Reloaded(loaded.settings)
    }
}
