use chrono::NaiveDate;
use uuid::Uuid;

use super::activity::ActivityLog;
use super::catalog::{Sector, SiteConfig, Team};
use super::employee::{Employee, People};
use super::task::{check_date_order, Task, TaskStatus};
use crate::error::{Error, Result};

/// The whole site state: four independently persisted collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub tasks: Vec<Task>,
    pub people: People,
    pub config: SiteConfig,
    pub activities: ActivityLog,
}

/// Fields of the "new task" form.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub team: String,
    pub sector: String,
    pub start: NaiveDate,
    pub due: NaiveDate,
}

/// A partial task edit; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub team: Option<String>,
    pub sector: Option<String>,
    pub start: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub progress: Option<u8>,
}

/// A partial employee edit.
#[derive(Debug, Clone, Default)]
pub struct EmployeeEdit {
    pub name: Option<String>,
    pub team: Option<String>,
    pub role: Option<String>,
}

/// How many records a cascading rename touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOutcome {
    pub tasks: usize,
    pub employees: usize,
}

/// Task list filter. Empty lists match everything; the search term matches
/// task names case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub teams: Vec<String>,
    pub sectors: Vec<String>,
    pub statuses: Vec<TaskStatus>,
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
            && self.sectors.is_empty()
            && self.statuses.is_empty()
            && self.search.as_deref().map_or(true, |s| s.trim().is_empty())
    }

    pub fn matches(&self, task: &Task) -> bool {
        (self.teams.is_empty() || self.teams.contains(&task.team))
            && (self.sectors.is_empty() || self.sectors.contains(&task.sector))
            && (self.statuses.is_empty() || self.statuses.contains(&task.status))
            && self.search.as_deref().map_or(true, |q| {
                task.name.to_lowercase().contains(&q.trim().to_lowercase())
            })
    }
}

fn required(value: &str, field: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::MissingField { field });
    }
    Ok(value.to_string())
}

impl Project {
    /// Sanitise freshly loaded data: trim catalog names, clamp progress and
    /// recompute every task status.
    pub fn normalize(&mut self) {
        self.config.normalize();
        for task in &mut self.tasks {
            task.refresh_status();
        }
    }

    // ── Tasks ───────────────────────────────────────────────────

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a full task id or a unique prefix of its simple form.
    pub fn resolve_task_id(&self, query: &str) -> Result<Uuid> {
        let query = query.trim();
        if let Ok(id) = Uuid::parse_str(query) {
            return self
                .task(id)
                .map(|t| t.id)
                .ok_or_else(|| Error::TaskNotFound(query.to_string()));
        }
        let prefix = query.to_lowercase().replace('-', "");
        if prefix.is_empty() {
            return Err(Error::TaskNotFound(query.to_string()));
        }
        let mut hits = self
            .tasks
            .iter()
            .filter(|t| t.id.simple().to_string().starts_with(&prefix));
        match (hits.next(), hits.next()) {
            (Some(task), None) => Ok(task.id),
            (Some(_), Some(_)) => Err(Error::AmbiguousTaskId(query.to_string())),
            (None, _) => Err(Error::TaskNotFound(query.to_string())),
        }
    }

    fn check_task_refs(&self, team: &str, sector: &str) -> Result<()> {
        if !self.config.has_team(team) {
            return Err(Error::NotFound { kind: "team", name: team.to_string() });
        }
        if !self.config.has_sector(sector) {
            return Err(Error::NotFound { kind: "sector", name: sector.to_string() });
        }
        Ok(())
    }

    pub fn add_task(&mut self, new: NewTask) -> Result<Uuid> {
        let name = required(&new.name, "task name")?;
        let team = required(&new.team, "team")?;
        let sector = required(&new.sector, "sector")?;
        self.check_task_refs(&team, &sector)?;
        check_date_order(new.start, new.due)?;

        let task = Task::new(name, team, sector, new.start, new.due);
        let id = task.id;
        self.tasks.push(task);
        Ok(id)
    }

    /// Apply an edit. Everything is validated before anything changes.
    /// Returns true when this edit brought the task to 100%.
    pub fn update_task(&mut self, id: Uuid, edit: TaskEdit) -> Result<bool> {
        let current = self
            .task(id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

        let name = match &edit.name {
            Some(n) => required(n, "task name")?,
            None => current.name.clone(),
        };
        let team = edit.team.as_deref().map(str::trim).unwrap_or(current.team.as_str()).to_string();
        let sector = edit.sector.as_deref().map(str::trim).unwrap_or(current.sector.as_str()).to_string();
        if edit.team.is_some() || edit.sector.is_some() {
            self.check_task_refs(&team, &sector)?;
        }
        let start = edit.start.or(current.created_at);
        let due = edit.due.or(current.due_date);
        if let (Some(start), Some(due)) = (start, due) {
            check_date_order(start, due)?;
        }
        if let Some(p) = edit.progress.filter(|p| *p > 100) {
            return Err(Error::InvalidProgress(p));
        }

        let was_done = current.is_done();
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        task.name = name;
        task.team = team;
        task.sector = sector;
        task.created_at = start;
        task.due_date = due;
        if let Some(p) = edit.progress {
            task.set_progress(p)?;
        }
        task.refresh_status();
        Ok(!was_done && task.is_done())
    }

    pub fn remove_task(&mut self, id: Uuid) -> Result<Task> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        Ok(self.tasks.remove(pos))
    }

    pub fn filter_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    // ── People ──────────────────────────────────────────────────

    pub fn add_employee(&mut self, name: &str, team: &str, role: &str) -> Result<Uuid> {
        let name = required(name, "employee name")?;
        let team = required(team, "team")?;
        let role = required(role, "role")?;
        if !self.config.has_team(&team) {
            return Err(Error::NotFound { kind: "team", name: team });
        }
        if self.people.name_taken(&name, None) {
            return Err(Error::Duplicate { kind: "employee", name });
        }
        let employee = Employee::new(&name, team, role);
        let id = employee.id;
        self.people.employees.push(employee);
        Ok(id)
    }

    pub fn update_employee(&mut self, id: Uuid, edit: EmployeeEdit) -> Result<&Employee> {
        if self.people.get(id).is_none() {
            return Err(Error::EmployeeNotFound(id));
        }
        let name = edit.name.as_deref().map(|n| required(n, "employee name")).transpose()?;
        if let Some(name) = &name {
            if self.people.name_taken(name, Some(id)) {
                return Err(Error::Duplicate { kind: "employee", name: name.clone() });
            }
        }
        let team = edit.team.as_deref().map(|t| required(t, "team")).transpose()?;
        if let Some(team) = &team {
            if !self.config.has_team(team) {
                return Err(Error::NotFound { kind: "team", name: team.clone() });
            }
        }
        let role = edit.role.as_deref().map(|r| required(r, "role")).transpose()?;

        let employee = self.people.get_mut(id).ok_or(Error::EmployeeNotFound(id))?;
        if let Some(name) = name {
            employee.name = name;
        }
        if let Some(team) = team {
            employee.team = team;
        }
        if let Some(role) = role {
            employee.role = role;
        }
        Ok(employee)
    }

    pub fn remove_employee(&mut self, id: Uuid) -> Result<Employee> {
        let pos = self
            .people
            .employees
            .iter()
            .position(|e| e.id == id)
            .ok_or(Error::EmployeeNotFound(id))?;
        Ok(self.people.employees.remove(pos))
    }

    /// Find an employee by id or by name (case-insensitive, trimmed).
    pub fn resolve_employee(&self, query: &str) -> Result<Uuid> {
        let query = query.trim();
        if let Ok(id) = Uuid::parse_str(query) {
            return self.people.get(id).map(|e| e.id).ok_or(Error::EmployeeNotFound(id));
        }
        let wanted = query.to_lowercase();
        self.people
            .employees
            .iter()
            .find(|e| e.name.trim().to_lowercase() == wanted)
            .map(|e| e.id)
            .ok_or_else(|| Error::NotFound { kind: "employee", name: query.to_string() })
    }

    /// Employees in the team a task is assigned to.
    pub fn team_roster(&self, team: &str) -> Vec<&Employee> {
        self.people.employees.iter().filter(|e| e.team == team).collect()
    }

    // ── Teams ───────────────────────────────────────────────────

    pub fn add_team(&mut self, name: &str) -> Result<String> {
        let name = required(name, "team name")?;
        if self.config.team_name_taken(&name, None) {
            return Err(Error::Duplicate { kind: "team", name });
        }
        self.config.teams.push(Team { name: name.clone() });
        Ok(name)
    }

    /// Number of tasks and employees that reference a team by name.
    pub fn team_usage(&self, name: &str) -> (usize, usize) {
        (
            self.tasks.iter().filter(|t| t.team == name).count(),
            self.people.employees.iter().filter(|e| e.team == name).count(),
        )
    }

    pub fn team_in_use(&self, name: &str) -> bool {
        self.team_usage(name) != (0, 0)
    }

    /// Rename a team and carry the new name into every task and employee
    /// that referenced the old one.
    pub fn rename_team(&mut self, old: &str, new: &str) -> Result<RenameOutcome> {
        let index = self
            .config
            .team_index(old)
            .ok_or_else(|| Error::NotFound { kind: "team", name: old.to_string() })?;
        let new = required(new, "team name")?;
        if self.config.team_name_taken(&new, Some(index)) {
            return Err(Error::Duplicate { kind: "team", name: new });
        }
        self.config.teams[index].name = new.clone();

        let mut outcome = RenameOutcome::default();
        for task in self.tasks.iter_mut().filter(|t| t.team == old) {
            task.team = new.clone();
            outcome.tasks += 1;
        }
        for employee in self.people.employees.iter_mut().filter(|e| e.team == old) {
            employee.team = new.clone();
            outcome.employees += 1;
        }
        Ok(outcome)
    }

    pub fn remove_team(&mut self, name: &str) -> Result<Team> {
        let index = self
            .config
            .team_index(name)
            .ok_or_else(|| Error::NotFound { kind: "team", name: name.to_string() })?;
        let (tasks, employees) = self.team_usage(name);
        if tasks + employees > 0 {
            return Err(Error::InUse { kind: "team", name: name.to_string(), tasks, employees });
        }
        Ok(self.config.teams.remove(index))
    }

    // ── Sectors ─────────────────────────────────────────────────

    pub fn add_sector(&mut self, name: &str, description: &str) -> Result<String> {
        let name = required(name, "sector name")?;
        if self.config.sector_name_taken(&name, None) {
            return Err(Error::Duplicate { kind: "sector", name });
        }
        self.config.sectors.push(Sector {
            name: name.clone(),
            description: description.trim().to_string(),
        });
        Ok(name)
    }

    pub fn sector_usage(&self, name: &str) -> usize {
        self.tasks.iter().filter(|t| t.sector == name).count()
    }

    pub fn sector_in_use(&self, name: &str) -> bool {
        self.sector_usage(name) > 0
    }

    /// Rename a sector and carry the new name into every task that
    /// referenced the old one. Employees have no sector.
    pub fn rename_sector(&mut self, old: &str, new: &str) -> Result<RenameOutcome> {
        let index = self
            .config
            .sector_index(old)
            .ok_or_else(|| Error::NotFound { kind: "sector", name: old.to_string() })?;
        let new = required(new, "sector name")?;
        if self.config.sector_name_taken(&new, Some(index)) {
            return Err(Error::Duplicate { kind: "sector", name: new });
        }
        self.config.sectors[index].name = new.clone();

        let mut outcome = RenameOutcome::default();
        for task in self.tasks.iter_mut().filter(|t| t.sector == old) {
            task.sector = new.clone();
            outcome.tasks += 1;
        }
        Ok(outcome)
    }

    pub fn describe_sector(&mut self, name: &str, description: &str) -> Result<()> {
        let index = self
            .config
            .sector_index(name)
            .ok_or_else(|| Error::NotFound { kind: "sector", name: name.to_string() })?;
        self.config.sectors[index].description = description.trim().to_string();
        Ok(())
    }

    pub fn remove_sector(&mut self, name: &str) -> Result<Sector> {
        let index = self
            .config
            .sector_index(name)
            .ok_or_else(|| Error::NotFound { kind: "sector", name: name.to_string() })?;
        let tasks = self.sector_usage(name);
        if tasks > 0 {
            return Err(Error::InUse { kind: "sector", name: name.to_string(), tasks, employees: 0 });
        }
        Ok(self.config.sectors.remove(index))
    }
}
