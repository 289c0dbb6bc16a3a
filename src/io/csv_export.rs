use std::path::Path;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::schedule::due_note;
use crate::model::Task;

const HEADER: [&str; 8] = [
    "Task", "Team", "Sector", "Start Date", "Due Date", "Progress", "Status", "Deadline",
];

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

/// Write tasks as semicolon-delimited CSV with a header row.
/// Dates are formatted as DD/MM/YYYY. Returns the number of tasks written.
pub fn write_csv<W: std::io::Write>(tasks: &[&Task], today: NaiveDate, writer: W) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

    wtr.write_record(HEADER)?;
    for task in tasks {
        let start = format_date(task.created_at);
        let due = format_date(task.due_date);
        let progress = format!("{}%", task.progress);
        let deadline = due_note(task, today).unwrap_or_default();
        wtr.write_record([
            task.name.as_str(),
            task.team.as_str(),
            task.sector.as_str(),
            start.as_str(),
            due.as_str(),
            progress.as_str(),
            task.status.label(),
            deadline.as_str(),
        ])?;
    }

    wtr.flush().map_err(|e| Error::Csv(e.into()))?;
    Ok(tasks.len())
}

/// Export tasks to a CSV file at `path`.
pub fn export_csv(tasks: &[&Task], today: NaiveDate, path: &Path) -> Result<usize> {
    if tasks.is_empty() {
        return Err(Error::NothingToExport);
    }
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    write_csv(tasks, today, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_one_row_per_task() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        let mut task = Task::new(
            "Pour slab",
            "Concrete",
            "Block A",
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 8).unwrap(),
        );
        task.set_progress(60).unwrap();

        let mut out = Vec::new();
        let written = write_csv(&[&task], today, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(written, 1);
        assert_eq!(lines[0], "Task;Team;Sector;Start Date;Due Date;Progress;Status;Deadline");
        assert_eq!(
            lines[1],
            "Pour slab;Concrete;Block A;01/04/2024;08/04/2024;60%;In Progress;2 days overdue"
        );
    }

    #[test]
    fn refuses_to_export_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        let err = export_csv(&[], today, &dir.path().join("out.csv")).unwrap_err();
        assert!(matches!(err, Error::NothingToExport));
    }
}
