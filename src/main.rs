mod cli;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, EmployeeCommand, GoalsCommand, SectorCommand, TaskCommand, TeamCommand};
use site_planner::model::schedule::due_note;
use site_planner::model::{EmployeeEdit, NewTask, Task, TaskEdit, TaskFilter};
use site_planner::{Settings, SiteApp};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "site_planner=warn",
        1 => "site_planner=info",
        _ => "site_planner=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let args = Cli::parse();
    init_logging(args.verbose);

    let mut settings = Settings::load(args.config.as_deref()).context("cannot load settings")?;
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }

    let mut app = SiteApp::open(&settings, args.key.as_deref())?;
    let today = Local::now().date_naive();

    match args.command {
        Command::Status => show_status(&app, today),
        Command::Task(cmd) => run_task(&mut app, cmd, today)?,
        Command::Employee(cmd) => run_employee(&mut app, cmd)?,
        Command::Sector(cmd) => run_sector(&mut app, cmd)?,
        Command::Team(cmd) => run_team(&mut app, cmd)?,
        Command::Goals(GoalsCommand::Show) => show_goals(&app),
        Command::Goals(GoalsCommand::Set { text }) => {
            app.set_goals(&text)?;
            println!("{}", app.status_message);
        }
        Command::Activity { all } => {
            let entries = if all {
                app.project.activities.all()
            } else {
                app.recent_activities()
            };
            if entries.is_empty() {
                println!("No activity recorded yet.");
            }
            for a in entries {
                println!("{} {}  {}: {}", a.kind.icon(), a.display_time(), a.title, a.description);
            }
        }
        Command::Report { filter, csv } => {
            let filter = TaskFilter::from(filter);
            let report = app.report(&filter, today)?;
            print!("{report}");
            if let Some(path) = csv {
                app.export_csv(&filter, today, &path)?;
                println!("\n{}", app.status_message);
            }
        }
        Command::Backup { output } => {
            let out = output.unwrap_or_else(|| {
                PathBuf::from(format!("backup_site_{}.zip", Local::now().format("%Y%m%d_%H%M%S")))
            });
            app.backup_archive(&out)?;
            println!("{}", app.status_message);
        }
    }
    Ok(())
}

fn show_status(app: &SiteApp, today: NaiveDate) {
    println!("Session: {}", app.role());
    if app.project.tasks.is_empty() {
        println!("\nNo tasks yet. Add tasks to see progress.");
    } else {
        println!();
        print!("{}", app.summary(today));
    }
    println!();
    show_goals(app);
    println!("\nRecent activity");
    if app.recent_activities().is_empty() {
        println!("  nothing yet");
    }
    for a in app.recent_activities() {
        println!("  {} {}  {}: {}", a.kind.icon(), a.display_time(), a.title, a.description);
    }
}

fn show_goals(app: &SiteApp) {
    println!("Project goals");
    let goals = app.project.config.goal_lines();
    if goals.is_empty() {
        println!("  No goals defined.");
    }
    for goal in goals {
        println!("  - {goal}");
    }
}

fn print_task_row(task: &Task, today: NaiveDate) {
    let due = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "{}  {:<28} {:<14} {:<14} {:<12} {:>3}%  {}{}",
        task.short_id(),
        task.name,
        task.team,
        task.sector,
        task.status.label(),
        task.progress,
        due,
        due_note(task, today).map(|n| format!(" ({n})")).unwrap_or_default(),
    );
}

fn run_task(app: &mut SiteApp, cmd: TaskCommand, today: NaiveDate) -> anyhow::Result<()> {
    match cmd {
        TaskCommand::Add { name, team, sector, start, due } => {
            let start = start.unwrap_or(today);
            let due = due.unwrap_or(start + Duration::days(7));
            let id = app.add_task(NewTask { name, team, sector, start, due })?;
            println!("{} ({id})", app.status_message);
        }
        TaskCommand::List { filter } => {
            let filter = TaskFilter::from(filter);
            let tasks = app.project.filter_tasks(&filter);
            if tasks.is_empty() {
                println!("No tasks found.");
            }
            for task in tasks {
                print_task_row(task, today);
            }
        }
        TaskCommand::Show { id } => {
            let id = app.project.resolve_task_id(&id)?;
            let task = app
                .project
                .task(id)
                .with_context(|| format!("task {id} vanished"))?;
            println!("{}", task.name);
            println!("  id        {}", task.id);
            println!("  team      {}", task.team);
            println!("  sector    {}", task.sector);
            println!("  status    {} ({}%)", task.status, task.progress);
            if let Some(start) = task.created_at {
                println!("  start     {start}");
            }
            if let Some(due) = task.due_date {
                let note = due_note(task, today).map(|n| format!(" ({n})")).unwrap_or_default();
                println!("  due       {due}{note}");
            }
            let roster = app.project.team_roster(&task.team);
            println!("\nTeam {}", task.team);
            if roster.is_empty() {
                println!("  no members registered");
            }
            for member in roster {
                println!("  {:<24} {}", member.name, member.role);
            }
        }
        TaskCommand::Update { id, name, team, sector, start, due, progress } => {
            let id = app.project.resolve_task_id(&id)?;
            app.update_task(id, TaskEdit { name, team, sector, start, due, progress })?;
            println!("{}", app.status_message);
        }
        TaskCommand::Delete { id, yes } => {
            let id = app.project.resolve_task_id(&id)?;
            if !yes {
                let name = app.project.task(id).map(|t| t.name.as_str()).unwrap_or_default();
                println!("Really delete task '{name}'? Re-run with --yes to confirm.");
                return Ok(());
            }
            app.delete_task(id)?;
            println!("{}", app.status_message);
        }
    }
    Ok(())
}

fn run_employee(app: &mut SiteApp, cmd: EmployeeCommand) -> anyhow::Result<()> {
    match cmd {
        EmployeeCommand::Add { name, team, role } => {
            app.add_employee(&name, &team, &role)?;
            println!("{}", app.status_message);
        }
        EmployeeCommand::List { team } => {
            let employees: Vec<_> = app
                .project
                .people
                .employees
                .iter()
                .filter(|e| team.as_deref().map_or(true, |t| e.team == t))
                .collect();
            if employees.is_empty() {
                println!("No employees registered.");
            }
            for e in employees {
                println!("{:<24} {:<16} {:<16} {}", e.name, e.team, e.role, e.id);
            }
        }
        EmployeeCommand::Update { employee, name, team, role } => {
            let id = app.project.resolve_employee(&employee)?;
            app.update_employee(id, EmployeeEdit { name, team, role })?;
            println!("{}", app.status_message);
        }
        EmployeeCommand::Delete { employee } => {
            let id = app.project.resolve_employee(&employee)?;
            app.delete_employee(id)?;
            println!("{}", app.status_message);
        }
    }
    Ok(())
}

fn run_sector(app: &mut SiteApp, cmd: SectorCommand) -> anyhow::Result<()> {
    match cmd {
        SectorCommand::Add { name, description } => app.add_sector(&name, &description)?,
        SectorCommand::List => {
            if app.project.config.sectors.is_empty() {
                println!("No sectors configured.");
            }
            for sector in &app.project.config.sectors {
                let used = app.project.sector_usage(&sector.name);
                println!("{:<24} {:>3} task(s)  {}", sector.name, used, sector.description);
            }
            return Ok(());
        }
        SectorCommand::Rename { old, new } => {
            app.rename_sector(&old, &new)?;
        }
        SectorCommand::Describe { name, description } => app.describe_sector(&name, &description)?,
        SectorCommand::Delete { name } => app.delete_sector(&name)?,
    }
    println!("{}", app.status_message);
    Ok(())
}

fn run_team(app: &mut SiteApp, cmd: TeamCommand) -> anyhow::Result<()> {
    match cmd {
        TeamCommand::Add { name } => app.add_team(&name)?,
        TeamCommand::List => {
            if app.project.config.teams.is_empty() {
                println!("No teams configured.");
            }
            for team in &app.project.config.teams {
                let (tasks, employees) = app.project.team_usage(&team.name);
                println!("{:<24} {:>3} task(s) {:>3} employee(s)", team.name, tasks, employees);
            }
            return Ok(());
        }
        TeamCommand::Rename { old, new } => {
            app.rename_team(&old, &new)?;
        }
        TeamCommand::Delete { name } => app.delete_team(&name)?,
    }
    println!("{}", app.status_message);
    Ok(())
}
