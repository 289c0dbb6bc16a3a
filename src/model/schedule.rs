use std::fmt;

use chrono::NaiveDate;

use super::task::Task;

/// Days ahead within which a pending task counts as due soon.
pub const DUE_SOON_DAYS: i64 = 7;

/// Urgency of a pending task relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DueCategory {
    Overdue,
    DueSoon,
    OnTrack,
    NoDueDate,
}

impl DueCategory {
    /// Display order, most urgent first.
    pub const ALL: [DueCategory; 4] = [Self::Overdue, Self::DueSoon, Self::OnTrack, Self::NoDueDate];

    pub fn classify(due: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(due) = due else {
            return Self::NoDueDate;
        };
        match (due - today).num_days() {
            d if d < 0 => Self::Overdue,
            d if d <= DUE_SOON_DAYS => Self::DueSoon,
            _ => Self::OnTrack,
        }
    }
}

impl fmt::Display for DueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overdue => "Overdue",
            Self::DueSoon => "Due in 7 days",
            Self::OnTrack => "On track",
            Self::NoDueDate => "No due date",
        })
    }
}

/// True if the task is unfinished and its due date has passed.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.is_done() && task.due_date.is_some_and(|d| d < today)
}

/// Short deadline note for a task: "3 days overdue", "due in 5 days".
/// `None` for finished tasks and tasks without a due date.
pub fn due_note(task: &Task, today: NaiveDate) -> Option<String> {
    if task.is_done() {
        return None;
    }
    let delta = (task.due_date? - today).num_days();
    Some(match delta {
        d if d < 0 => format!("{} days overdue", -d),
        0 => "due today".to_string(),
        d => format!("due in {d} days"),
    })
}

/// Earliest start and latest due date across all tasks.
pub fn span<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Option<(NaiveDate, NaiveDate)> {
    let mut start: Option<NaiveDate> = None;
    let mut end: Option<NaiveDate> = None;
    for task in tasks {
        if let Some(s) = task.created_at {
            start = Some(start.map_or(s, |cur| cur.min(s)));
        }
        if let Some(d) = task.due_date {
            end = Some(end.map_or(d, |cur| cur.max(d)));
        }
    }
    let (start, end) = (start?, end?);
    Some((start, end.max(start)))
}
