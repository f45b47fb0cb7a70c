use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregate::Settings;
use crate::error::StoreError;
use crate::store::Store;

pub const APP_NAME: &str = "sip_tracker";
pub const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Json,
    Sled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_file: String,
    pub store: StoreKind,
    pub database: String,
    pub export_file: String,
    pub currency: String,
    pub funds: Vec<String>,
    pub years: Vec<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: "sips.json".to_string(),
            store: StoreKind::Json,
            database: "database".to_string(),
            export_file: "sips-export.json".to_string(),
            currency: "INR".to_string(),
            funds: vec![
                "Parag Parikh Flexi Cap".to_string(),
                "ICICI Prudential Bluechip".to_string(),
            ],
            years: vec![2025, 2026, 2027],
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    pub fn path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    pub fn settings(&self) -> Settings {
        Settings::new(self.funds.clone(), self.years.clone())
    }

    /// Opens the configured store. An explicit data file always means the
    /// JSON backend.
    pub fn open_store(&self, file_override: Option<&str>) -> Result<Store, StoreError> {
        match (file_override.filter(|f| !f.is_empty()), self.store) {
            (Some(file), _) => Ok(Store::json(file)),
            (None, StoreKind::Json) => Ok(Store::json(&self.data_file)),
            (None, StoreKind::Sled) => Store::open_sled(&self.database),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Config::default().settings();
        assert_eq!(settings.years, vec![2025, 2026, 2027]);
        assert_eq!(settings.months.len(), 12);
        assert_eq!(settings.funds.len(), 2);
    }

    #[test]
    fn test_settings_years_are_sorted_and_unique() {
        let cfg = Config {
            years: vec![2027, 2025, 2027, 2026],
            ..Config::default()
        };
        let settings = cfg.settings();
        assert_eq!(settings.years, vec![2025, 2026, 2027]);
        assert_eq!(settings.grid().len(), 36);
        assert_eq!(settings.grid()[0].year, 2025);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"currency": "USD", "store": "sled"}"#).unwrap();
        assert_eq!(cfg.currency, "USD");
        assert_eq!(cfg.store, StoreKind::Sled);
        assert_eq!(cfg.data_file, "sips.json");
    }

    #[test]
    fn test_file_override_forces_json_store() {
        let cfg = Config {
            store: StoreKind::Sled,
            ..Config::default()
        };
        let store = cfg.open_store(Some("other.json")).unwrap();
        assert_eq!(store.describe(), "json:other.json");
    }
}
