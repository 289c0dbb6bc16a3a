use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix for environment overrides, e.g. `SITE_PLANNER_DATA_DIR`.
pub const ENV_PREFIX: &str = "SITE_PLANNER";

/// Default document names, shared with existing site data directories.
pub const TASKS_FILE: &str = "datatasks.json";
pub const ACTIVITIES_FILE: &str = "data_activities.json";
pub const CONFIG_FILE: &str = "dataconfig.json";
pub const PEOPLE_FILE: &str = "data_people.json";
pub const BACKUP_DIR: &str = "backup_tasks";

/// Runtime settings. Every key has a default, so an empty configuration is
/// valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the four JSON documents.
    pub data_dir: PathBuf,
    /// Where task backups go. Defaults to `<data_dir>/backup_tasks`.
    pub backup_dir: Option<PathBuf>,
    pub tasks_file: String,
    pub activities_file: String,
    pub config_file: String,
    pub people_file: String,
    /// Shared secret that unlocks the editor role. Unset means nobody can edit.
    pub access_key: Option<String>,
    /// How many activity entries the dashboard shows.
    pub recent_activity_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backup_dir: None,
            tasks_file: TASKS_FILE.into(),
            activities_file: ACTIVITIES_FILE.into(),
            config_file: CONFIG_FILE.into(),
            people_file: PEOPLE_FILE.into(),
            access_key: None,
            recent_activity_limit: 5,
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "SitePlanner")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// The user-level settings file, if the platform has a config directory.
pub fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "SitePlanner")
        .map(|dirs| dirs.config_dir().join("site-planner.toml"))
}

impl Settings {
    /// Layer, lowest first: built-in defaults, the user config file, an
    /// explicit file, then `SITE_PLANNER_*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with_env(explicit, None)
    }

    /// Like [`Settings::load`], reading variables from `vars` instead of the
    /// process environment when given. Values stay strings until a typed
    /// field asks for a number, so a key such as `007` is kept verbatim.
    fn load_with_env(explicit: Option<&Path>, vars: Option<config::Map<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(user) = user_config_file() {
            builder = builder.add_source(config::File::from(user).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let built = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(vars))
            .build()?;
        Ok(built.try_deserialize()?)
    }

    /// Parse settings from a TOML string over the defaults.
    pub fn from_toml(toml: &str) -> Result<Self> {
        let built = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(built.try_deserialize()?)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(BACKUP_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.tasks_file, "datatasks.json");
        assert_eq!(settings.recent_activity_limit, 5);
        assert_eq!(settings.access_key, None);
    }

    #[test]
    fn toml_overrides_selected_keys() {
        let settings = Settings::from_toml(
            r#"
                data_dir = "/srv/obra"
                access_key = "s3cret"
                recent_activity_limit = 10
            "#,
        )
        .unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/obra"));
        assert_eq!(settings.access_key.as_deref(), Some("s3cret"));
        assert_eq!(settings.recent_activity_limit, 10);
        assert_eq!(settings.people_file, "data_people.json");
        assert_eq!(settings.backup_dir(), PathBuf::from("/srv/obra/backup_tasks"));
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.toml");
        std::fs::write(&path, "tasks_file = \"obra_tasks.json\"\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.tasks_file, "obra_tasks.json");
    }

    #[test]
    fn env_values_are_not_reinterpreted_as_numbers() {
        let mut vars = config::Map::new();
        vars.insert("SITE_PLANNER_ACCESS_KEY".to_string(), "007".to_string());
        vars.insert("SITE_PLANNER_RECENT_ACTIVITY_LIMIT".to_string(), "8".to_string());
        vars.insert("OTHER_ACCESS_KEY".to_string(), "ignored".to_string());

        let settings = Settings::load_with_env(None, Some(vars)).unwrap();
        assert_eq!(settings.access_key.as_deref(), Some("007"));
        assert_eq!(settings.recent_activity_limit, 8);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
