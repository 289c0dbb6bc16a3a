use std::path::Path;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::auth::{AccessGate, Role};
use crate::error::{Error, Result};
use crate::io::{archive, csv_export, DataStore};
use crate::model::{
    Activity, ActivityKind, EmployeeEdit, NewTask, Project, RenameOutcome, Task, TaskEdit,
    TaskFilter,
};
use crate::report::{ProjectSummary, Report};
use crate::settings::Settings;

/// One working session over the site data.
///
/// Every mutation is validated, applied in memory, flushed to its JSON file
/// and recorded in the activity log. Mutations need the editor role.
pub struct SiteApp {
    pub project: Project,
    store: DataStore,
    role: Role,
    recent_limit: usize,

    // Status message
    pub status_message: String,
}

impl SiteApp {
    /// Load the data named by `settings` and enter with the given key.
    pub fn open(settings: &Settings, key: Option<&str>) -> Result<Self> {
        let gate = AccessGate::new(settings.access_key.clone());
        let role = gate.enter(key)?;
        let store = DataStore::from_settings(settings);
        Ok(Self::with_store(store, role, settings.recent_activity_limit))
    }

    pub fn with_store(store: DataStore, role: Role, recent_limit: usize) -> Self {
        let project = store.load();
        Self {
            project,
            store,
            role,
            recent_limit,
            status_message: "Ready".to_string(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    fn require_editor(&self) -> Result<()> {
        if self.role.can_edit() {
            Ok(())
        } else {
            Err(Error::ReadOnly)
        }
    }

    /// Prepend an activity and persist the whole log.
    fn log(&mut self, kind: ActivityKind, title: &str, description: String) -> Result<()> {
        self.project
            .activities
            .record(Activity::new(kind, title, description));
        self.store.save_activities(&self.project.activities)
    }

    fn save_tasks(&self) -> Result<()> {
        self.store.save_tasks(&self.project.tasks)?;
        Ok(())
    }

    // --- Task operations ---

    pub fn add_task(&mut self, new: NewTask) -> Result<Uuid> {
        self.require_editor()?;
        let (name, team) = (new.name.trim().to_string(), new.team.trim().to_string());
        let id = self.project.add_task(new)?;
        self.save_tasks()?;
        info!(%id, task = %name, "task created");
        self.log(ActivityKind::New, "New task created", format!("'{name}' assigned to {team}."))?;
        self.status_message = format!("Task '{name}' added");
        Ok(id)
    }

    pub fn update_task(&mut self, id: Uuid, edit: TaskEdit) -> Result<()> {
        self.require_editor()?;
        let old_name = self
            .project
            .task(id)
            .map(|t| t.name.clone())
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let completed = self.project.update_task(id, edit)?;
        self.save_tasks()?;
        info!(%id, task = %old_name, completed, "task updated");
        if completed {
            self.log(ActivityKind::Complete, "Task completed", format!("Task '{old_name}' reached 100%."))?;
        } else {
            self.log(ActivityKind::Update, "Task updated", format!("Task '{old_name}' was updated."))?;
        }
        self.status_message = format!("Task '{old_name}' updated");
        Ok(())
    }

    pub fn delete_task(&mut self, id: Uuid) -> Result<Task> {
        self.require_editor()?;
        let task = self.project.remove_task(id)?;
        self.save_tasks()?;
        info!(%id, task = %task.name, "task deleted");
        self.log(ActivityKind::Delete, "Task deleted", format!("Task '{}' was removed.", task.name))?;
        self.status_message = format!("Task '{}' deleted", task.name);
        Ok(task)
    }

    // --- People ---

    pub fn add_employee(&mut self, name: &str, team: &str, role: &str) -> Result<Uuid> {
        self.require_editor()?;
        let id = self.project.add_employee(name, team, role)?;
        self.store.save_people(&self.project.people)?;
        let (name, team) = (name.trim(), team.trim());
        info!(%id, employee = %name, "employee added");
        self.log(ActivityKind::User, "New employee", format!("{name} added to team {team}."))?;
        self.status_message = format!("Employee '{name}' added");
        Ok(id)
    }

    pub fn update_employee(&mut self, id: Uuid, edit: EmployeeEdit) -> Result<()> {
        self.require_editor()?;
        let name = self.project.update_employee(id, edit)?.name.clone();
        self.store.save_people(&self.project.people)?;
        info!(%id, employee = %name, "employee updated");
        self.log(ActivityKind::Update, "Employee updated", format!("Details of '{name}' were updated."))?;
        self.status_message = format!("Employee '{name}' updated");
        Ok(())
    }

    pub fn delete_employee(&mut self, id: Uuid) -> Result<()> {
        self.require_editor()?;
        let employee = self.project.remove_employee(id)?;
        self.store.save_people(&self.project.people)?;
        info!(%id, employee = %employee.name, "employee removed");
        self.log(
            ActivityKind::Delete,
            "Employee removed",
            format!("Employee '{}' was removed.", employee.name),
        )?;
        self.status_message = format!("Employee '{}' removed", employee.name);
        Ok(())
    }

    // --- Sectors and teams ---

    pub fn add_sector(&mut self, name: &str, description: &str) -> Result<()> {
        self.require_editor()?;
        let name = self.project.add_sector(name, description)?;
        self.store.save_config(&self.project.config)?;
        info!(sector = %name, "sector added");
        self.log(ActivityKind::Config, "Sector added", format!("Sector '{name}' was created."))?;
        self.status_message = format!("Sector '{name}' added");
        Ok(())
    }

    pub fn describe_sector(&mut self, name: &str, description: &str) -> Result<()> {
        self.require_editor()?;
        self.project.describe_sector(name, description)?;
        self.store.save_config(&self.project.config)?;
        self.log(ActivityKind::Update, "Sector updated", format!("Description of '{name}' was updated."))?;
        self.status_message = format!("Sector '{name}' updated");
        Ok(())
    }

    /// Rename a sector; config and tasks are committed together. On a failed
    /// save the in-memory state is rolled back as well.
    pub fn rename_sector(&mut self, old: &str, new: &str) -> Result<RenameOutcome> {
        self.require_editor()?;
        let before = self.project.clone();
        let outcome = self.project.rename_sector(old, new)?;
        if let Err(e) = self.store.save_catalog_cascade(&self.project) {
            self.project = before;
            return Err(e);
        }
        let new = new.trim();
        info!(from = %old, to = %new, tasks = outcome.tasks, "sector renamed");
        self.log(ActivityKind::Update, "Sector updated", format!("Sector '{old}' renamed to '{new}'."))?;
        self.status_message = format!("Sector '{old}' renamed to '{new}' ({} task(s) updated)", outcome.tasks);
        Ok(outcome)
    }

    pub fn delete_sector(&mut self, name: &str) -> Result<()> {
        self.require_editor()?;
        let sector = self.project.remove_sector(name)?;
        self.store.save_config(&self.project.config)?;
        info!(sector = %sector.name, "sector removed");
        self.log(ActivityKind::Delete, "Sector removed", format!("Sector '{}' was removed.", sector.name))?;
        self.status_message = format!("Sector '{}' removed", sector.name);
        Ok(())
    }

    pub fn add_team(&mut self, name: &str) -> Result<()> {
        self.require_editor()?;
        let name = self.project.add_team(name)?;
        self.store.save_config(&self.project.config)?;
        info!(team = %name, "team added");
        self.log(ActivityKind::Config, "Team added", format!("Team '{name}' was created."))?;
        self.status_message = format!("Team '{name}' added");
        Ok(())
    }

    /// Rename a team; config, tasks and people are committed together.
    pub fn rename_team(&mut self, old: &str, new: &str) -> Result<RenameOutcome> {
        self.require_editor()?;
        let before = self.project.clone();
        let outcome = self.project.rename_team(old, new)?;
        if let Err(e) = self.store.save_catalog_cascade(&self.project) {
            self.project = before;
            return Err(e);
        }
        let new = new.trim();
        info!(
            from = %old,
            to = %new,
            tasks = outcome.tasks,
            employees = outcome.employees,
            "team renamed"
        );
        self.log(ActivityKind::Update, "Team updated", format!("Team '{old}' renamed to '{new}'."))?;
        self.status_message = format!(
            "Team '{old}' renamed to '{new}' ({} task(s), {} employee(s) updated)",
            outcome.tasks, outcome.employees
        );
        Ok(outcome)
    }

    pub fn delete_team(&mut self, name: &str) -> Result<()> {
        self.require_editor()?;
        let team = self.project.remove_team(name)?;
        self.store.save_config(&self.project.config)?;
        info!(team = %team.name, "team removed");
        self.log(ActivityKind::Delete, "Team removed", format!("Team '{}' was removed.", team.name))?;
        self.status_message = format!("Team '{}' removed", team.name);
        Ok(())
    }

    pub fn set_goals(&mut self, goals: &str) -> Result<()> {
        self.require_editor()?;
        self.project.config.project_goals = goals.to_string();
        self.store.save_config(&self.project.config)?;
        self.log(ActivityKind::Config, "Goals updated", "Project goals were set or updated.".to_string())?;
        self.status_message = "Goals saved".to_string();
        Ok(())
    }

    // --- Views and exports ---

    /// The most recent activities, capped to the configured display limit.
    pub fn recent_activities(&self) -> &[Activity] {
        self.project.activities.recent(self.recent_limit)
    }

    pub fn summary(&self, today: NaiveDate) -> ProjectSummary {
        let tasks: Vec<&Task> = self.project.tasks.iter().collect();
        ProjectSummary::compute(&tasks, &self.project.people, today)
    }

    pub fn report(&self, filter: &TaskFilter, today: NaiveDate) -> Result<Report> {
        Report::build(&self.project, filter, today)
    }

    pub fn export_csv(&mut self, filter: &TaskFilter, today: NaiveDate, path: &Path) -> Result<usize> {
        let tasks = self.project.filter_tasks(filter);
        let count = csv_export::export_csv(&tasks, today, path)?;
        info!(path = %path.display(), count, "tasks exported to csv");
        self.status_message = format!("Exported {count} tasks to CSV");
        Ok(count)
    }

    /// Flush everything, then zip the four data files into `out`.
    pub fn backup_archive(&mut self, out: &Path) -> Result<usize> {
        self.require_editor()?;
        self.store.save_all(&self.project)?;
        let count = archive::write_archive(&self.store.data_files(), out)?;
        info!(path = %out.display(), files = count, "backup archive written");
        self.status_message = format!("Backup of {count} file(s) written to {}", out.display());
        Ok(count)
    }
}
