//! Progress metrics over a (filtered) task list, and the plain-text report
//! built from them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate};

use crate::error::{Error, Result};
use crate::model::schedule::{self, due_note, is_overdue};
use crate::model::{DueCategory, People, Project, Task, TaskFilter, TaskStatus};

/// Task counts per status for one team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamWorkload {
    pub team: String,
    pub planned: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl TeamWorkload {
    pub fn total(&self) -> usize {
        self.planned + self.in_progress + self.done
    }
}

/// Headline numbers for the dashboard and the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Mean progress in percent; 0 with no tasks.
    pub average_progress: f64,
    /// Share of completed tasks in percent.
    pub completion_rate: f64,
    pub overdue: usize,
    pub by_status: Vec<(TaskStatus, usize)>,
    /// Mean progress per sector, highest first.
    pub sector_progress: Vec<(String, f64)>,
    /// Busiest team first.
    pub team_workload: Vec<TeamWorkload>,
    /// Deadline urgency of unfinished tasks.
    pub due_categories: Vec<(DueCategory, usize)>,
    /// Employees per team, largest first.
    pub headcount: Vec<(String, usize)>,
    pub span: Option<(NaiveDate, NaiveDate)>,
}

impl ProjectSummary {
    pub fn compute(tasks: &[&Task], people: &People, today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.is_done()).count();
        let average_progress = if total > 0 {
            tasks.iter().map(|t| f64::from(t.progress)).sum::<f64>() / total as f64
        } else {
            0.0
        };
        let completion_rate = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let by_status = TaskStatus::ALL
            .iter()
            .map(|s| (*s, tasks.iter().filter(|t| t.status == *s).count()))
            .collect();

        let mut sectors: BTreeMap<&str, (u32, usize)> = BTreeMap::new();
        for task in tasks {
            let entry = sectors.entry(task.sector.as_str()).or_default();
            entry.0 += u32::from(task.progress);
            entry.1 += 1;
        }
        let mut sector_progress: Vec<(String, f64)> = sectors
            .into_iter()
            .map(|(name, (sum, n))| (name.to_string(), f64::from(sum) / n as f64))
            .collect();
        sector_progress.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut teams: BTreeMap<&str, TeamWorkload> = BTreeMap::new();
        for task in tasks {
            let load = teams.entry(task.team.as_str()).or_insert_with(|| TeamWorkload {
                team: task.team.clone(),
                ..Default::default()
            });
            match task.status {
                TaskStatus::Planned => load.planned += 1,
                TaskStatus::InProgress => load.in_progress += 1,
                TaskStatus::Done => load.done += 1,
            }
        }
        let mut team_workload: Vec<TeamWorkload> = teams.into_values().collect();
        team_workload.sort_by(|a, b| b.total().cmp(&a.total()).then_with(|| a.team.cmp(&b.team)));

        let due_categories = DueCategory::ALL
            .iter()
            .map(|c| {
                let n = tasks
                    .iter()
                    .filter(|t| !t.is_done() && DueCategory::classify(t.due_date, today) == *c)
                    .count();
                (*c, n)
            })
            .collect();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for employee in &people.employees {
            *counts.entry(employee.team.as_str()).or_default() += 1;
        }
        let mut headcount: Vec<(String, usize)> =
            counts.into_iter().map(|(t, n)| (t.to_string(), n)).collect();
        headcount.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            total,
            completed,
            pending: total - completed,
            average_progress,
            completion_rate,
            overdue: tasks.iter().filter(|t| is_overdue(t, today)).count(),
            by_status,
            sector_progress,
            team_workload,
            due_categories,
            headcount,
            span: schedule::span(tasks.iter().copied()),
        }
    }
}

/// One line of the task table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: String,
    pub team: String,
    pub sector: String,
    pub status: TaskStatus,
    pub progress: u8,
    pub due_date: Option<NaiveDate>,
    pub deadline: Option<String>,
    pub overdue: bool,
}

/// One employee with the tasks assigned to their team.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterRow {
    pub name: String,
    pub team: String,
    pub role: String,
    pub team_tasks: Vec<String>,
}

/// Progress report over the tasks matching a filter.
#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: DateTime<Local>,
    pub filter: String,
    pub goals: Vec<String>,
    pub summary: ProjectSummary,
    pub rows: Vec<ReportRow>,
    pub roster: Vec<RosterRow>,
}

fn describe_filter(filter: &TaskFilter) -> String {
    let list = |items: &[String], all: &str| {
        if items.is_empty() {
            all.to_string()
        } else {
            items.join(", ")
        }
    };
    let statuses: Vec<String> = filter.statuses.iter().map(|s| s.to_string()).collect();
    format!(
        "team: {} | sector: {} | status: {}",
        list(&filter.teams, "all"),
        list(&filter.sectors, "all"),
        list(&statuses, "all"),
    )
}

impl Report {
    /// Fails with [`Error::NothingToExport`] when no task matches.
    pub fn build(project: &Project, filter: &TaskFilter, today: NaiveDate) -> Result<Self> {
        let tasks = project.filter_tasks(filter);
        if tasks.is_empty() {
            return Err(Error::NothingToExport);
        }

        let rows = tasks
            .iter()
            .map(|t| ReportRow {
                name: t.name.clone(),
                team: t.team.clone(),
                sector: t.sector.clone(),
                status: t.status,
                progress: t.progress,
                due_date: t.due_date,
                deadline: due_note(t, today),
                overdue: is_overdue(t, today),
            })
            .collect();

        let mut roster: Vec<RosterRow> = project
            .people
            .employees
            .iter()
            .map(|e| RosterRow {
                name: e.name.clone(),
                team: e.team.clone(),
                role: e.role.clone(),
                team_tasks: tasks
                    .iter()
                    .filter(|t| t.team == e.team)
                    .map(|t| t.name.clone())
                    .collect(),
            })
            .collect();
        roster.sort_by(|a, b| a.team.cmp(&b.team).then_with(|| a.name.cmp(&b.name)));

        Ok(Self {
            generated_at: Local::now(),
            filter: describe_filter(filter),
            goals: project.config.goal_lines().into_iter().map(String::from).collect(),
            summary: ProjectSummary::compute(&tasks, &project.people, today),
            rows,
            roster,
        })
    }
}

impl fmt::Display for ProjectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Overall progress   {:.1}%", self.average_progress)?;
        writeln!(f, "Tasks              {} ({} done, {} pending)", self.total, self.completed, self.pending)?;
        writeln!(f, "Completion rate    {:.1}%", self.completion_rate)?;
        writeln!(f, "Overdue            {}", self.overdue)?;
        if let Some((start, end)) = self.span {
            writeln!(f, "Schedule           {} to {}", start.format("%d/%m/%Y"), end.format("%d/%m/%Y"))?;
        }

        writeln!(f, "\nBy status")?;
        for (status, n) in &self.by_status {
            writeln!(f, "  {:<14} {n}", status.label())?;
        }
        if self.pending > 0 {
            writeln!(f, "\nDeadlines (pending tasks)")?;
            for (category, n) in &self.due_categories {
                writeln!(f, "  {:<14} {n}", category.to_string())?;
            }
        }
        if !self.sector_progress.is_empty() {
            writeln!(f, "\nAverage progress by sector")?;
            for (sector, progress) in &self.sector_progress {
                writeln!(f, "  {sector:<20} {progress:>5.1}%")?;
            }
        }
        if !self.team_workload.is_empty() {
            writeln!(f, "\nWorkload by team      planned  in progress  done")?;
            for load in &self.team_workload {
                writeln!(
                    f,
                    "  {:<20} {:>7}  {:>11}  {:>4}",
                    load.team, load.planned, load.in_progress, load.done
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SITE PROGRESS REPORT")?;
        writeln!(f, "Issued {}", self.generated_at.format("%d/%m/%Y %H:%M"))?;
        writeln!(f, "Filters: {}", self.filter)?;

        writeln!(f, "\n1. Goals")?;
        if self.goals.is_empty() {
            writeln!(f, "  No goals defined.")?;
        }
        for goal in &self.goals {
            writeln!(f, "  - {goal}")?;
        }

        writeln!(f, "\n2. Summary")?;
        write!(f, "{}", self.summary)?;

        writeln!(f, "\n3. Tasks")?;
        for row in &self.rows {
            let due = row
                .due_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "-".into());
            writeln!(
                f,
                "{} {:<28} {:<14} {:<14} {:<12} {:>3}%  {}{}",
                if row.overdue { "!" } else { " " },
                row.name,
                row.team,
                row.sector,
                row.status.label(),
                row.progress,
                due,
                row.deadline.as_deref().map(|n| format!(" ({n})")).unwrap_or_default(),
            )?;
        }

        writeln!(f, "\n4. Personnel")?;
        if self.roster.is_empty() {
            writeln!(f, "  No employees registered.")?;
        }
        for (team, n) in &self.summary.headcount {
            writeln!(f, "  {team:<20} {n} employee(s)")?;
        }
        for row in &self.roster {
            let tasks = if row.team_tasks.is_empty() {
                "no tasks assigned to the team".to_string()
            } else {
                row.team_tasks.join(", ")
            };
            writeln!(f, "  {:<22} {:<14} {:<16} {}", row.name, row.team, row.role, tasks)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, TaskEdit};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project() -> Project {
        let mut p = Project::default();
        p.add_team("Alpha").unwrap();
        p.add_team("Beta").unwrap();
        p.add_sector("Block A", "").unwrap();
        p.add_sector("Block B", "").unwrap();
        let mut add = |name: &str, team: &str, sector: &str, due: NaiveDate, progress: u8| {
            let id = p
                .add_task(NewTask {
                    name: name.into(),
                    team: team.into(),
                    sector: sector.into(),
                    start: date(2024, 4, 1),
                    due,
                })
                .unwrap();
            p.update_task(id, TaskEdit { progress: Some(progress), ..Default::default() })
                .unwrap();
        };
        add("Excavation", "Alpha", "Block A", date(2024, 4, 5), 100);
        add("Footings", "Alpha", "Block A", date(2024, 4, 8), 50);
        add("Drainage", "Beta", "Block B", date(2024, 4, 14), 0);
        add("Landscaping", "Beta", "Block B", date(2024, 6, 1), 10);
        p.add_employee("Rui", "Alpha", "Foreman").unwrap();
        p.add_employee("Ines", "Beta", "Operator").unwrap();
        p.add_employee("Tiago", "Beta", "Helper").unwrap();
        p
    }

    #[test]
    fn summary_counts_and_rates() {
        let p = project();
        let tasks: Vec<&Task> = p.tasks.iter().collect();
        let s = ProjectSummary::compute(&tasks, &p.people, date(2024, 4, 10));

        assert_eq!(s.total, 4);
        assert_eq!(s.completed, 1);
        assert_eq!(s.pending, 3);
        assert!((s.average_progress - 40.0).abs() < 1e-9);
        assert!((s.completion_rate - 25.0).abs() < 1e-9);
        assert_eq!(s.overdue, 1);
        assert_eq!(
            s.by_status,
            vec![(TaskStatus::Planned, 1), (TaskStatus::InProgress, 2), (TaskStatus::Done, 1)]
        );
        assert_eq!(
            s.due_categories,
            vec![
                (DueCategory::Overdue, 1),
                (DueCategory::DueSoon, 1),
                (DueCategory::OnTrack, 1),
                (DueCategory::NoDueDate, 0),
            ]
        );
        assert_eq!(s.span, Some((date(2024, 4, 1), date(2024, 6, 1))));
    }

    #[test]
    fn sector_progress_is_sorted_descending() {
        let p = project();
        let tasks: Vec<&Task> = p.tasks.iter().collect();
        let s = ProjectSummary::compute(&tasks, &p.people, date(2024, 4, 10));
        assert_eq!(s.sector_progress[0].0, "Block A");
        assert!((s.sector_progress[0].1 - 75.0).abs() < 1e-9);
        assert!((s.sector_progress[1].1 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn headcount_and_workload() {
        let p = project();
        let tasks: Vec<&Task> = p.tasks.iter().collect();
        let s = ProjectSummary::compute(&tasks, &p.people, date(2024, 4, 10));
        assert_eq!(s.headcount, vec![("Beta".to_string(), 2), ("Alpha".to_string(), 1)]);
        let alpha = s.team_workload.iter().find(|w| w.team == "Alpha").unwrap();
        assert_eq!((alpha.planned, alpha.in_progress, alpha.done), (0, 1, 1));
    }

    #[test]
    fn empty_summary_has_zero_rates() {
        let s = ProjectSummary::compute(&[], &People::default(), date(2024, 4, 10));
        assert_eq!(s.total, 0);
        assert_eq!(s.average_progress, 0.0);
        assert_eq!(s.completion_rate, 0.0);
        assert_eq!(s.span, None);
    }

    #[test]
    fn report_applies_filter_and_lists_team_tasks_per_employee() {
        let mut p = project();
        p.config.project_goals = "Close the structure\n\nHand over Block A".into();
        let filter = TaskFilter { teams: vec!["Beta".into()], ..Default::default() };
        let report = Report::build(&p, &filter, date(2024, 4, 10)).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.goals, vec!["Close the structure", "Hand over Block A"]);
        let rui = report.roster.iter().find(|r| r.name == "Rui").unwrap();
        assert!(rui.team_tasks.is_empty());
        let ines = report.roster.iter().find(|r| r.name == "Ines").unwrap();
        assert_eq!(ines.team_tasks, vec!["Drainage", "Landscaping"]);

        let text = report.to_string();
        assert!(text.contains("team: Beta | sector: all | status: all"));
        assert!(text.contains("Drainage"));
        assert!(!text.contains("Excavation"));
    }

    #[test]
    fn report_with_no_matching_tasks_fails() {
        let p = project();
        let filter = TaskFilter { search: Some("crane".into()), ..Default::default() };
        assert!(matches!(
            Report::build(&p, &filter, date(2024, 4, 10)),
            Err(Error::NothingToExport)
        ));
    }
}
