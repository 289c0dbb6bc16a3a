use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lenient;
use crate::error::{Error, Result};

/// Lifecycle stage of a task. Never stored authoritatively: it is derived
/// from `progress` on every load and every edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Planned, Self::InProgress, Self::Done];

    /// 0 is planned, 100 is done, anything in between is in progress.
    pub fn from_progress(progress: u8) -> Self {
        match progress {
            0 => Self::Planned,
            p if p >= 100 => Self::Done,
            _ => Self::InProgress,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "planned" | "not started" | "new" => Ok(Self::Planned),
            "in progress" | "active" | "started" => Ok(Self::InProgress),
            "done" | "complete" | "completed" | "finished" => Ok(Self::Done),
            other => Err(format!(
                "unknown status '{other}' (expected planned, in-progress or done)"
            )),
        }
    }
}

/// A unit of construction work tracked by progress and dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient::id")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Name of the responsible team.
    #[serde(default)]
    pub team: String,
    /// Name of the site sector the work happens in.
    #[serde(default)]
    pub sector: String,
    /// Percent complete, 0..=100. Out-of-range values on disk are clamped.
    #[serde(default, deserialize_with = "lenient::progress")]
    pub progress: u8,
    /// Start date. Unparsable dates on disk load as `None`.
    #[serde(default, with = "lenient::date")]
    pub created_at: Option<NaiveDate>,
    #[serde(default, with = "lenient::date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_deserializing)]
    pub status: TaskStatus,
}

impl Task {
    /// Create a new planned task. The caller validates the date order.
    pub fn new(
        name: impl Into<String>,
        team: impl Into<String>,
        sector: impl Into<String>,
        start: NaiveDate,
        due: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            team: team.into(),
            sector: sector.into(),
            progress: 0,
            created_at: Some(start),
            due_date: Some(due),
            status: TaskStatus::Planned,
        }
    }

    pub fn set_progress(&mut self, progress: u8) -> Result<()> {
        if progress > 100 {
            return Err(Error::InvalidProgress(progress));
        }
        self.progress = progress;
        self.refresh_status();
        Ok(())
    }

    /// Clamp out-of-range progress and recompute the derived status.
    pub fn refresh_status(&mut self) {
        self.progress = self.progress.min(100);
        self.status = TaskStatus::from_progress(self.progress);
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Short id used in listings.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

/// Reject a start date that falls after the due date.
pub fn check_date_order(start: NaiveDate, due: NaiveDate) -> Result<()> {
    if start > due {
        return Err(Error::InvalidDateRange { start, due });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_is_planned_only_at_zero() {
        assert_eq!(TaskStatus::from_progress(0), TaskStatus::Planned);
    }

    #[test]
    fn status_is_in_progress_strictly_between_bounds() {
        for p in 1..100 {
            assert_eq!(TaskStatus::from_progress(p), TaskStatus::InProgress, "progress {p}");
        }
    }

    #[test]
    fn status_is_done_at_hundred() {
        assert_eq!(TaskStatus::from_progress(100), TaskStatus::Done);
    }

    #[test]
    fn set_progress_recomputes_status() {
        let mut task = Task::new("Pour slab", "Concrete", "Block A", date(2024, 3, 1), date(2024, 3, 10));
        assert_eq!(task.status, TaskStatus::Planned);

        task.set_progress(40).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);

        task.set_progress(100).unwrap();
        assert!(task.is_done());
    }

    #[test]
    fn set_progress_rejects_values_over_hundred() {
        let mut task = Task::new("Pour slab", "Concrete", "Block A", date(2024, 3, 1), date(2024, 3, 10));
        let err = task.set_progress(120).unwrap_err();
        assert!(matches!(err, Error::InvalidProgress(120)));
        assert_eq!(task.progress, 0);
    }

    #[test]
    fn date_order_allows_same_day_and_rejects_reversed() {
        assert!(check_date_order(date(2024, 5, 1), date(2024, 5, 1)).is_ok());
        assert!(matches!(
            check_date_order(date(2024, 5, 2), date(2024, 5, 1)),
            Err(Error::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn stored_status_is_ignored_on_load() {
        let json = r#"{
            "id": "2f0c6f47-7a33-4c55-a2a4-3a4c2f0f6a11",
            "name": "Formwork",
            "team": "Carpentry",
            "sector": "Block B",
            "progress": 100,
            "created_at": "2024-01-10",
            "due_date": "2024-01-20",
            "status": "Planejada"
        }"#;
        let mut task: Task = serde_json::from_str(json).unwrap();
        task.refresh_status();
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn missing_id_is_generated_and_bad_dates_become_none() {
        let json = r#"{"name": "Scaffold", "created_at": "not a date", "due_date": "2024-02-01T00:00:00"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.id.is_nil());
        assert_eq!(task.created_at, None);
        assert_eq!(task.due_date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn one_bad_record_does_not_sink_the_list() {
        let json = r#"[
            {"id": "2f0c6f47-7a33-4c55-a2a4-3a4c2f0f6a11", "name": "Formwork", "progress": 40},
            {"id": "legacy-7", "name": "Rebar", "progress": 300},
            {"name": "Plaster", "progress": -5.5}
        ]"#;
        let mut tasks: Vec<Task> = serde_json::from_str(json).unwrap();
        tasks.iter_mut().for_each(Task::refresh_status);

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].id.to_string(), "2f0c6f47-7a33-4c55-a2a4-3a4c2f0f6a11");
        assert!(!tasks[1].id.is_nil());
        assert_eq!(tasks[1].progress, 100);
        assert_eq!(tasks[1].status, TaskStatus::Done);
        assert_eq!(tasks[2].progress, 0);
        assert_eq!(tasks[2].status, TaskStatus::Planned);
    }

    #[test]
    fn dates_serialize_as_iso_strings() {
        let task = Task::new("Survey", "Topo", "Access road", date(2024, 6, 3), date(2024, 6, 7));
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["created_at"], "2024-06-03");
        assert_eq!(value["due_date"], "2024-06-07");
        assert_eq!(value["status"], "Planned");
    }

    #[test]
    fn status_parses_from_cli_spellings() {
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("Done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("later".parse::<TaskStatus>().is_err());
    }
}
