use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use site_planner::model::{TaskFilter, TaskStatus};

#[derive(Parser, Debug)]
#[command(name = "site-planner", version, about = "Construction site planning from the command line")]
pub struct Cli {
    /// Access key that unlocks editing for this session
    #[arg(long, short = 'k', env = "SITE_PLANNER_KEY", hide_env_values = true, global = true)]
    pub key: Option<String>,

    /// Additional settings file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the data files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Dashboard: progress, goals and recent activity
    Status,
    /// Create, list and edit tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage the workforce
    #[command(subcommand)]
    Employee(EmployeeCommand),
    /// Manage site sectors
    #[command(subcommand)]
    Sector(SectorCommand),
    /// Manage teams
    #[command(subcommand)]
    Team(TeamCommand),
    /// Show or set the project goals
    #[command(subcommand)]
    Goals(GoalsCommand),
    /// Show the activity log
    Activity {
        /// Show the whole history instead of the latest entries
        #[arg(long)]
        all: bool,
    },
    /// Progress report over the (filtered) tasks
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        /// Also export the task table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Zip all data files into one archive
    Backup {
        /// Archive path (default: backup_site_<timestamp>.zip)
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only tasks of this team (repeatable)
    #[arg(long = "team")]
    pub teams: Vec<String>,
    /// Only tasks in this sector (repeatable)
    #[arg(long = "sector")]
    pub sectors: Vec<String>,
    /// Only tasks with this status: planned, in-progress, done (repeatable)
    #[arg(long = "status")]
    pub statuses: Vec<TaskStatus>,
    /// Case-insensitive search in task names
    #[arg(long)]
    pub search: Option<String>,
}

impl From<FilterArgs> for TaskFilter {
    fn from(args: FilterArgs) -> Self {
        TaskFilter {
            teams: args.teams,
            sectors: args.sectors,
            statuses: args.statuses,
            search: args.search,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum TaskCommand {
    /// Create a planned task
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        team: String,
        #[arg(long)]
        sector: String,
        /// Start date, YYYY-MM-DD (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Due date, YYYY-MM-DD (default: start + 7 days)
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// List tasks
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show one task and the roster of its team
    Show {
        /// Task id or unique id prefix
        id: String,
    },
    /// Edit a task
    Update {
        /// Task id or unique id prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Percent complete, 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        progress: Option<u8>,
    },
    /// Delete a task
    Delete {
        /// Task id or unique id prefix
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum EmployeeCommand {
    /// Register an employee
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        team: String,
        #[arg(long)]
        role: String,
    },
    /// List employees
    List {
        #[arg(long)]
        team: Option<String>,
    },
    /// Edit an employee
    Update {
        /// Employee id or name
        employee: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Remove an employee
    Delete {
        /// Employee id or name
        employee: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SectorCommand {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List,
    /// Rename a sector and every task that references it
    Rename { old: String, new: String },
    /// Replace a sector's description
    Describe { name: String, description: String },
    /// Delete a sector no task references
    Delete { name: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TeamCommand {
    Add {
        name: String,
    },
    List,
    /// Rename a team and every task and employee that references it
    Rename { old: String, new: String },
    /// Delete a team no task or employee references
    Delete { name: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum GoalsCommand {
    Show,
    /// Replace the goals text (one goal per line)
    Set { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_task_update() {
        let cli = Cli::try_parse_from([
            "site-planner", "-k", "secret", "task", "update", "3f2a", "--progress", "40", "--due", "2024-08-01",
        ])
        .unwrap();
        assert_eq!(cli.key.as_deref(), Some("secret"));
        match cli.command {
            Command::Task(TaskCommand::Update { id, progress, due, .. }) => {
                assert_eq!(id, "3f2a");
                assert_eq!(progress, Some(40));
                assert_eq!(due, NaiveDate::from_ymd_opt(2024, 8, 1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_progress_over_hundred() {
        assert!(Cli::try_parse_from(["site-planner", "task", "update", "abc", "--progress", "120"]).is_err());
    }

    #[test]
    fn filter_args_accept_repeated_values() {
        let cli = Cli::try_parse_from([
            "site-planner", "report", "--team", "Alpha", "--team", "Beta", "--status", "in-progress",
        ])
        .unwrap();
        let Command::Report { filter, .. } = cli.command else {
            panic!("expected report");
        };
        let filter = TaskFilter::from(filter);
        assert_eq!(filter.teams, vec!["Alpha", "Beta"]);
        assert_eq!(filter.statuses, vec![TaskStatus::InProgress]);
    }
}
