use crate::error::{ConfigError, StorageError};
use crate::storage::write_json_atomic;
use chrono::Duration as ChronoDuration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Points and stat changes attached to each care action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economy {
    pub feed_reward: i32,
    pub gift_reward: i32,
    pub play_reward: i32,
    pub play_happiness: u32,
    pub exercise_reward: i32,
    pub vet_cost: i32,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            feed_reward: 10,
            gift_reward: 20,
            play_reward: 10,
            play_happiness: 20,
            exercise_reward: 15,
            vet_cost: 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub decay_interval_ms: u64,          // 10s
    pub sleep_recovery_interval_ms: u64, // 1s
    pub sleep_recovery_step: u32,
    pub cooldown_secs: i64,
    /// How much away-time a loaded save simulates; 0 resumes as saved.
    pub catch_up_max_secs: i64,
    pub economy: Economy,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            decay_interval_ms: 10_000,
            sleep_recovery_interval_ms: 1_000,
            sleep_recovery_step: 1,
            cooldown_secs: crate::cooldown::DEFAULT_COOLDOWN_SECS,
            catch_up_max_secs: 0,
            economy: Economy::default(),
        }
    }
}

impl Rules {
    pub fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms.max(1))
    }

    pub fn sleep_recovery_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_recovery_interval_ms.max(1))
    }

    /// A zero step would leave a sleeping pet asleep forever.
    pub fn sleep_recovery_step(&self) -> u32 {
        self.sleep_recovery_step.max(1)
    }

    pub fn cooldown(&self) -> ChronoDuration {
        ChronoDuration::seconds(self.cooldown_secs.max(0))
    }

    pub fn catch_up_max(&self) -> ChronoDuration {
        ChronoDuration::seconds(self.catch_up_max_secs.max(0))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autosave_secs: u64,
    pub default_slot: String,
    pub rules: Rules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_secs: 10,
            default_slot: "default".to_string(),
            rules: Rules::default(),
        }
    }
}

impl Settings {
    pub fn autosave_every(&self) -> Duration {
        Duration::from_secs(self.autosave_secs.max(1))
    }
}

#[derive(Clone, Debug)]
pub struct Paths {
    pub save_dir: PathBuf,
    pub settings_path: PathBuf,
    pub parental_path: PathBuf,
}

impl Paths {
    /// Layout under an explicit data directory; creates it if missing.
    pub fn under(dir: &Path) -> Result<Self, ConfigError> {
        let save_dir = dir.join("saves");
        fs::create_dir_all(&save_dir).map_err(|source| ConfigError::CreateDir {
            path: save_dir.clone(),
            source,
        })?;
        Ok(Self {
            save_dir,
            settings_path: dir.join("settings.json"),
            parental_path: dir.join("parental_settings.json"),
        })
    }
}

pub fn project_paths() -> Result<Paths, ConfigError> {
    let proj =
        ProjectDirs::from("com", "pocketpet", "PocketPet").ok_or(ConfigError::NoProjectDirs)?;
    Paths::under(proj.data_local_dir())
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Settings::default(),
    };
    match serde_json::from_str::<Settings>(&text) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring unreadable settings file");
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), StorageError> {
    write_json_atomic(path, settings)
}
