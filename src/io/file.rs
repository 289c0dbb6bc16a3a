use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{ActivityLog, People, Project, SiteConfig, Task};
use crate::settings::{self, Settings};

/// Read a JSON document, falling back to `default` when the file is missing
/// or cannot be parsed. Never fails.
pub fn load_or_default<T: DeserializeOwned>(path: &Path, default: T) -> T {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "data file missing, using default");
            return default;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read data file, using default");
            return default;
        }
    };
    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt data file, using default");
            default
        }
    }
}

/// Serialize `value` as pretty JSON into a temp file next to `path`.
/// Nothing is visible at `path` until the returned file is persisted.
fn stage<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<NamedTempFile> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let json = serde_json::to_string_pretty(value)?;
    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    file.write_all(json.as_bytes()).map_err(|e| Error::io(path, e))?;
    file.flush().map_err(|e| Error::io(path, e))?;
    Ok(file)
}

fn persist(file: NamedTempFile, path: &Path) -> Result<()> {
    file.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

/// Move staged files into place in order. If one move fails, every target
/// already replaced gets its previous content back (or is removed if it did
/// not exist) before the error is returned.
fn commit(staged: Vec<(NamedTempFile, &Path)>) -> Result<()> {
    let mut replaced: Vec<(&Path, Option<Vec<u8>>)> = Vec::new();
    for (file, path) in staged {
        let previous = std::fs::read(path).ok();
        if let Err(err) = persist(file, path) {
            for (path, previous) in replaced.into_iter().rev() {
                let restored = match previous {
                    Some(bytes) => std::fs::write(path, bytes),
                    None => std::fs::remove_file(path),
                };
                if let Err(e) = restored {
                    warn!(path = %path.display(), error = %e, "cannot roll back data file");
                }
            }
            return Err(err);
        }
        replaced.push((path, previous));
    }
    Ok(())
}

/// Atomically replace `path` with the pretty JSON form of `value`.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    persist(stage(path, value)?, path)
}

/// Locations of the four data documents and the backup directory.
#[derive(Debug, Clone)]
pub struct DataStore {
    pub tasks_path: PathBuf,
    pub activities_path: PathBuf,
    pub config_path: PathBuf,
    pub people_path: PathBuf,
    pub backup_dir: PathBuf,
}

impl DataStore {
    /// Default file names inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            tasks_path: dir.join(settings::TASKS_FILE),
            activities_path: dir.join(settings::ACTIVITIES_FILE),
            config_path: dir.join(settings::CONFIG_FILE),
            people_path: dir.join(settings::PEOPLE_FILE),
            backup_dir: dir.join(settings::BACKUP_DIR),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let dir = &settings.data_dir;
        Self {
            tasks_path: dir.join(&settings.tasks_file),
            activities_path: dir.join(&settings.activities_file),
            config_path: dir.join(&settings.config_file),
            people_path: dir.join(&settings.people_file),
            backup_dir: settings.backup_dir(),
        }
    }

    /// The four data documents, in save order.
    pub fn data_files(&self) -> [&Path; 4] {
        [
            &self.tasks_path,
            &self.activities_path,
            &self.config_path,
            &self.people_path,
        ]
    }

    /// Load every collection, degrading each one to empty on failure, and
    /// normalise the result.
    pub fn load(&self) -> Project {
        let mut project = Project {
            tasks: load_or_default(&self.tasks_path, Vec::new()),
            people: load_or_default(&self.people_path, People::default()),
            config: load_or_default(&self.config_path, SiteConfig::default()),
            activities: load_or_default(&self.activities_path, ActivityLog::default()),
        };
        project.normalize();
        debug!(
            tasks = project.tasks.len(),
            employees = project.people.employees.len(),
            teams = project.config.teams.len(),
            sectors = project.config.sectors.len(),
            activities = project.activities.len(),
            "site data loaded"
        );
        project
    }

    /// Save the task list and write a timestamped backup copy.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<Option<PathBuf>> {
        save_json(&self.tasks_path, tasks)?;
        self.backup_tasks(tasks)
    }

    pub fn save_activities(&self, log: &ActivityLog) -> Result<()> {
        save_json(&self.activities_path, log)
    }

    pub fn save_config(&self, config: &SiteConfig) -> Result<()> {
        save_json(&self.config_path, config)
    }

    pub fn save_people(&self, people: &People) -> Result<()> {
        save_json(&self.people_path, people)
    }

    /// Write `backup_tasks_<YYYY-MM-DD_HH-MM>.json` into the backup
    /// directory. Skipped for an empty task list. Saves within the same
    /// minute share one file.
    pub fn backup_tasks(&self, tasks: &[Task]) -> Result<Option<PathBuf>> {
        if tasks.is_empty() {
            return Ok(None);
        }
        let stamp = Local::now().format("%Y-%m-%d_%H-%M");
        let path = self.backup_dir.join(format!("backup_tasks_{stamp}.json"));
        save_json(&path, tasks)?;
        debug!(path = %path.display(), "task backup written");
        Ok(Some(path))
    }

    /// Save config, tasks and people together. Every document is staged in
    /// a temp file first and only then moved into place; if any step fails
    /// all three files keep their previous content.
    pub fn save_catalog_cascade(&self, project: &Project) -> Result<()> {
        let staged = vec![
            (stage(&self.config_path, &project.config)?, self.config_path.as_path()),
            (stage(&self.tasks_path, &project.tasks)?, self.tasks_path.as_path()),
            (stage(&self.people_path, &project.people)?, self.people_path.as_path()),
        ];
        commit(staged)?;
        self.backup_tasks(&project.tasks)?;
        info!("catalog change committed to config, tasks and people");
        Ok(())
    }

    /// Flush every in-memory collection to disk.
    pub fn save_all(&self, project: &Project) -> Result<()> {
        self.save_catalog_cascade(project)?;
        self.save_activities(&project.activities)
    }
}
