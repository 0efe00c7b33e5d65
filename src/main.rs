//! `workaasana` command line client
//!
//! Each invocation opens one view over the collections it needs, refreshes
//! it, and prints the result as text or JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rolling_logger::LoggerOptions;
use serde::Serialize;

use workaasana::cache::SqliteCache;
use workaasana::config::{Config, CONFIG_FILE_NAME};
use workaasana::domain::{
    Collection, NewProject, NewTask, NewTeam, ProjectStatus, TaskStatus, Team, TeamAvatars,
};
use workaasana::filter::StatusFilter;
use workaasana::gateway::HttpGateway;
use workaasana::store::{store_tasks_for_project, DisplayState};
use workaasana::sync::{MutationReport, RefreshOutcome, RefreshReport};
use workaasana::{SyncHub, ViewSync};

#[derive(Parser)]
#[command(name = "workaasana", version, about = "Workaasana project manager client")]
struct Cli {
    /// Config file (JSON)
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Skip the local cache entirely
    #[arg(long, global = true)]
    no_cache: bool,

    /// Echo log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Projects and tasks, filtered
    Dashboard {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value = "all")]
        project_status: StatusFilter<ProjectStatus>,
        #[arg(long, default_value = "all")]
        task_status: StatusFilter<TaskStatus>,
    },
    /// Projects with their task counts
    Projects,
    /// Teams with member avatars
    Teams {
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Status distributions and per-project/per-team counts
    Report,
    /// Change a project's status
    SetStatus { project_id: String, status: ProjectStatus },
    NewProject {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    NewTask {
        name: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        team: String,
        /// Owner name; repeatable
        #[arg(long = "owner")]
        owners: Vec<String>,
        /// Tag; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Estimated hours
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long, default_value = "To Do")]
        status: TaskStatus,
    },
    NewTeam {
        name: String,
        /// Member name; repeatable
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Append a member to a team
    AddMember { team_id: String, name: String },
}

impl Command {
    fn needs(&self) -> &'static [Collection] {
        match self {
            Command::Dashboard { .. } => &[Collection::Projects, Collection::Tasks],
            Command::Projects => &[Collection::Projects, Collection::Tasks],
            Command::Teams { .. } | Command::NewTeam { .. } | Command::AddMember { .. } => &[Collection::Teams],
            Command::Report => &Collection::ALL,
            Command::SetStatus { .. } | Command::NewProject { .. } => &[Collection::Projects],
            Command::NewTask { .. } => &[Collection::Tasks],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let options = LoggerOptions::new(&config.log_dir, "workaasana")
        .with_level(&config.log_level)?
        .with_stderr(cli.verbose);
    if let Err(e) = rolling_logger::init_with(options) {
        eprintln!("warning: file logging disabled: {}", e);
    }

    let gateway = HttpGateway::with_timeout(config.api_base.clone(), config.request_timeout())
        .context("failed to build HTTP client")?;
    let mut hub = SyncHub::new(Arc::new(gateway));
    if !cli.no_cache {
        match SqliteCache::open(&config.cache_path) {
            Ok(cache) => hub = hub.with_cache(Arc::new(cache)),
            Err(e) => log::warn!("[CACHE] running without cache: {}", e),
        }
    }

    let mut view = hub.open_view(cli.command.needs());
    let refresh = view.refresh().await;
    warn_stale(&refresh);

    let out = Output { json: cli.json };
    match cli.command {
        Command::Dashboard {
            query,
            project_status,
            task_status,
        } => {
            let projects = view.filtered_projects(&project_status, &query);
            let tasks = view.filtered_tasks(&task_status, &query);
            if out.json {
                return out.print(&serde_json::json!({ "projects": projects, "tasks": tasks }));
            }
            println!("Projects ({})", describe(view.projects().display_state(), projects.len()));
            for p in projects {
                println!("  [{}] {} ({})", p.display_status(), p.name, p.id);
            }
            println!("Tasks ({})", describe(view.tasks().display_state(), tasks.len()));
            for t in tasks {
                println!("  [{}] {} ({})", t.display_status(), t.name, t.id);
            }
        }
        Command::Projects => print_projects(&view, &out)?,
        Command::Teams { query } => {
            let teams = view.searched_teams(&query);
            if out.json {
                let rows: Vec<TeamRow> = teams.iter().copied().map(TeamRow::new).collect();
                return out.print(&rows);
            }
            println!("Teams ({})", describe(view.teams().display_state(), teams.len()));
            for team in teams {
                let avatars = team.avatars();
                let overflow = if avatars.overflow > 0 {
                    format!(" +{}", avatars.overflow)
                } else {
                    String::new()
                };
                println!("  {} ({}) [{}{}]", team.display_name(), team.id, avatars.labels.join(" "), overflow);
            }
        }
        Command::Report => {
            let report = view.report();
            if out.json {
                return out.print(&report);
            }
            println!("Project status");
            for c in &report.project_status {
                println!("  {:<12} {}", c.status, c.count);
            }
            println!("Task status");
            for c in &report.task_status {
                println!("  {:<12} {}", c.status, c.count);
            }
            println!("Hours per task");
            for h in &report.hours_per_task {
                println!("  {:<24} {}", h.name, h.hours);
            }
            println!("Tasks per project");
            for c in &report.tasks_per_project {
                println!("  {:<24} {}", c.name, c.tasks);
            }
            println!("Tasks per team");
            for c in &report.tasks_per_team {
                println!("  {:<24} {}", c.name, c.tasks);
            }
        }
        Command::SetStatus { project_id, status } => {
            let report = view.set_project_status(&project_id, status).await?;
            print_mutation(&out, &report, &format!("project {} is now {}", project_id, status))?;
        }
        Command::AddMember { team_id, name } => {
            let report = view.add_team_member(&team_id, &name).await?;
            print_mutation(&out, &report, &format!("added {} to team {}", name.trim(), team_id))?;
        }
        Command::NewProject { name, description } => {
            let project = view.create_project(&NewProject::new(name, description)).await?;
            if out.json {
                return out.print(&project);
            }
            println!("created project {} ({})", project.name, project.id);
        }
        Command::NewTask {
            name,
            project,
            team,
            owners,
            tags,
            hours,
            status,
        } => {
            let mut draft = NewTask::new(name, project, team);
            draft.owners = owners;
            draft.tags = tags;
            draft.time_to_complete = hours;
            draft.status = status;
            let task = view.create_task(&draft).await?;
            if out.json {
                return out.print(&task);
            }
            println!("created task {} ({})", task.name, task.id);
        }
        Command::NewTeam { name, members } => {
            let team = view.create_team(&NewTeam::new(name, members)).await?;
            if out.json {
                return out.print(&team);
            }
            println!("created team {} ({}) with {} members", team.name, team.id, team.members.len());
        }
    }
    Ok(())
}

struct Output {
    json: bool,
}

impl Output {
    fn print<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

#[derive(Serialize)]
struct TeamRow<'a> {
    #[serde(flatten)]
    team: &'a Team,
    #[serde(rename = "displayName")]
    display_name: &'a str,
    avatars: TeamAvatars,
}

impl<'a> TeamRow<'a> {
    fn new(team: &'a Team) -> Self {
        Self {
            team,
            display_name: team.display_name(),
            avatars: team.avatars(),
        }
    }
}

fn warn_stale(report: &RefreshReport) {
    for (collection, outcome) in &report.outcomes {
        match outcome {
            RefreshOutcome::Remote { .. } => {}
            RefreshOutcome::FromCache { error, .. } => {
                eprintln!("warning: showing cached {} ({})", collection, error)
            }
            RefreshOutcome::Unavailable { error } => {
                eprintln!("warning: could not load {} ({})", collection, error)
            }
        }
    }
}

fn describe(state: DisplayState, shown: usize) -> String {
    match state {
        DisplayState::Loading => "loading".to_string(),
        DisplayState::LoadFailed => "failed to load".to_string(),
        DisplayState::Empty => "none".to_string(),
        DisplayState::Items => shown.to_string(),
    }
}

fn print_projects(view: &ViewSync, out: &Output) -> Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        #[serde(flatten)]
        project: &'a workaasana::domain::Project,
        tasks: usize,
    }

    let rows: Vec<Row> = view
        .projects()
        .items
        .iter()
        .map(|project| Row {
            project,
            tasks: store_tasks_for_project(view.state(), &project.id).count(),
        })
        .collect();
    if out.json {
        return out.print(&rows);
    }
    println!("Projects ({})", describe(view.projects().display_state(), rows.len()));
    for row in rows {
        let deadline = row
            .project
            .deadline
            .map(|d| format!(" due {}", d))
            .unwrap_or_default();
        println!(
            "  [{}] {} ({}) {} tasks{}",
            row.project.display_status(),
            row.project.name,
            row.project.id,
            row.tasks,
            deadline
        );
    }
    Ok(())
}

fn print_mutation(out: &Output, report: &MutationReport, done: &str) -> Result<()> {
    if out.json {
        return out.print(&serde_json::json!({
            "confirmed": report.is_confirmed(),
            "warning": report.warning(),
        }));
    }
    match report.warning() {
        Some(warning) => eprintln!("warning: {}", warning),
        None => println!("{}", done),
    }
    Ok(())
}
