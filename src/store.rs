//! Persisted operator configuration.
//!
//! One JSON file holds the print defaults, the saved resource groups and
//! the voucher-number counter. The file is read once at startup and
//! rewritten whole on every change; writers hold the lock across the disk
//! write so the counter can never hand out the same number twice.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::models::{PrintConfig, SavedGroup};

const CONFIG_PATH_ENV: &str = "HUNT_PERMIT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "data/print_config.json";

/// Everything the config file stores.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredConfig {
    #[serde(flatten)]
    pub print: PrintConfig,
    pub saved_groups: Vec<SavedGroup>,
    /// Current value of the voucher-number counter.
    pub voucher_number: String,
}

/// Shared handle to the config file.
pub struct ConfigStore {
    path: PathBuf,
    state: RwLock<StoredConfig>,
}

impl ConfigStore {
    /// Open the store at `path`, reading the current contents if present.
    ///
    /// A missing file is an empty config; a corrupt file is an error so a
    /// typo in a hand-edited config never silently resets the counter.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => StoredConfig::default(),
            Err(err) => return Err(err),
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Resolve the config path from the environment, falling back to the
    /// default location next to the binary.
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn print_defaults(&self) -> PrintConfig {
        self.state.read().print.clone()
    }

    pub fn saved_groups(&self) -> Vec<SavedGroup> {
        self.state.read().saved_groups.clone()
    }

    pub fn voucher_number(&self) -> String {
        self.state.read().voucher_number.clone()
    }

    /// Persist a new counter value. Called only after a render succeeded.
    ///
    /// Memory and disk stay in step: if the write fails the in-memory
    /// counter is rolled back, so a later attempt re-reads the same value
    /// instead of skipping a number.
    pub fn set_voucher_number(&self, value: &str) -> io::Result<()> {
        let mut state = self.state.write();
        let previous = std::mem::replace(&mut state.voucher_number, value.to_string());
        if let Err(err) = self.persist(&state) {
            state.voucher_number = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Replace the whole stored config.
    pub fn replace(&self, config: StoredConfig) -> io::Result<()> {
        let mut state = self.state.write();
        let previous = std::mem::replace(&mut *state, config);
        if let Err(err) = self.persist(&state) {
            *state = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> StoredConfig {
        self.state.read().clone()
    }

    fn persist(&self, state: &StoredConfig) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(state)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        fs::write(&self.path, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("config.json")).unwrap();
        assert!(store.saved_groups().is_empty());
        assert!(store.voucher_number().is_empty());
    }

    #[test]
    fn test_open_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(ConfigStore::open(path).is_err());
    }

    #[test]
    fn test_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = ConfigStore::open(&path).unwrap();
        store.set_voucher_number("0013").unwrap();

        let reopened = ConfigStore::open(&path).unwrap();
        assert_eq!(reopened.voucher_number(), "0013");
    }

    #[test]
    fn test_failed_persist_rolls_back_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = ConfigStore::open(&path).unwrap();
        store.set_voucher_number("0007").unwrap();

        // A directory at the config path makes every write fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(store.set_voucher_number("0008").is_err());
        assert_eq!(store.voucher_number(), "0007");
    }

    #[test]
    fn test_stored_config_wire_names() {
        let json = r#"{
            "organizationName": "ООО «Охотхозяйство»",
            "savedGroups": [{"name": "гуси", "animals": ["Гусь"], "blankType": "Pink"}],
            "voucherNumber": "0007"
        }"#;

        let config: StoredConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.print.organization_name, "ООО «Охотхозяйство»");
        assert_eq!(config.saved_groups.len(), 1);
        assert_eq!(config.voucher_number, "0007");
    }

    #[test]
    fn test_replace_persists_groups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let store = ConfigStore::open(&path).unwrap();
        store
            .replace(StoredConfig {
                saved_groups: vec![SavedGroup {
                    name: "гуси".to_string(),
                    ..SavedGroup::default()
                }],
                ..StoredConfig::default()
            })
            .unwrap();

        let reopened = ConfigStore::open(&path).unwrap();
        assert_eq!(reopened.saved_groups().len(), 1);
    }
}
