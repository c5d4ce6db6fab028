use crate::error::StorageError;
use crate::parental::ParentalSettings;
use crate::session::PlayerSession;
use crate::snapshot::{ParentalSnapshot, PlayerSnapshot, SAVE_VERSION};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

const SLOT_EXT: &str = "json";

/// Serialises to a sibling temp file, then renames it over `path`.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, data).map_err(|e| StorageError::io(&tmp, e))?;
    atomic_rename(&tmp, path)
}

fn atomic_rename(from: &Path, to: &Path) -> Result<(), StorageError> {
    // rename() replaces atomically on Unix; Windows refuses to overwrite.
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).map_err(|e| StorageError::io(to, e))
}

/// A directory of player save slots, one `<slot>.json` per player.
#[derive(Clone, Debug)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let bad = slot.trim().is_empty()
            || slot.starts_with('.')
            || slot.chars().any(|c| matches!(c, '/' | '\\' | ':') || c.is_control());
        if bad {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.dir.join(format!("{slot}.{SLOT_EXT}")))
    }

    pub fn exists(&self, slot: &str) -> bool {
        self.slot_path(slot).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn save(
        &self,
        session: &PlayerSession,
        slot: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        write_json_atomic(&path, &session.to_snapshot(now))?;
        tracing::debug!(slot, path = %path.display(), "saved player");
        Ok(())
    }

    /// Returns the session together with the time it was saved.
    pub fn load(
        &self,
        slot: &str,
        cooldown: ChronoDuration,
    ) -> Result<(PlayerSession, DateTime<Utc>), StorageError> {
        let path = self.slot_path(slot)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(slot.to_string()))
            }
            Err(e) => return Err(StorageError::io(&path, e)),
        };
        let snap: PlayerSnapshot = serde_json::from_str(&text).map_err(|source| {
            StorageError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        if snap.version > SAVE_VERSION {
            tracing::warn!(slot, version = snap.version, "save written by a newer version");
        }
        Ok((PlayerSession::from_snapshot(&snap, cooldown), snap.saved_at))
    }

    /// Slot names present in the directory, sorted.
    pub fn list_slots(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.dir, e)),
        };
        let mut slots = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SLOT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                slots.push(stem.to_string());
            }
        }
        slots.sort();
        Ok(slots)
    }

    /// Loads the slot, revives its pet and writes it back. False when the
    /// slot has no pet.
    pub fn revive_pet(
        &self,
        slot: &str,
        cooldown: ChronoDuration,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let (mut session, _) = self.load(slot, cooldown)?;
        let Some(pet) = session.pet_mut() else {
            return Ok(false);
        };
        pet.revive();
        tracing::info!(slot, pet = pet.name(), "revived pet");
        self.save(&session, slot, now)?;
        Ok(true)
    }
}

/// Missing or unreadable parental settings fall back to defaults.
pub fn load_parental(path: &Path) -> ParentalSettings {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no parental settings yet, using defaults");
            return ParentalSettings::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), err = %e, "could not read parental settings");
            return ParentalSettings::default();
        }
    };
    match serde_json::from_str::<ParentalSnapshot>(&text) {
        Ok(snap) => snap.restore(),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring malformed parental settings");
            ParentalSettings::default()
        }
    }
}

pub fn save_parental(path: &Path, settings: &ParentalSettings) -> Result<(), StorageError> {
    write_json_atomic(path, &ParentalSnapshot::from(settings))
}
