//! Command-line front end for the task master core.
//!
//! # Responsibility
//! - Map subcommands onto `TaskService` calls.
//! - Own file I/O and printing; the core never touches either.
//! - Persist once after every mutating command.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use taskmaster_core::db::open_db;
use taskmaster_core::{
    checklist_file_name, core_version, default_log_level, init_logging, snapshot_file_name,
    ReconcileSummary, SnapshotRepository, SortColumn, SortDirection, SqliteSnapshotRepository,
    Task, TaskCandidate, TaskCategory, TaskId, TaskPatch, TaskQuery, TaskService, TaskSort,
    TaskStatus,
};

#[derive(Debug, Parser)]
#[command(name = "taskmaster", version, about = "Track tasks parsed from checklist documents")]
struct Cli {
    /// SQLite database holding the persisted snapshot.
    #[arg(long, env = "TASKMASTER_DB", default_value = "taskmaster.sqlite3", global = true)]
    db: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "TASKMASTER_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Directory for rolling log files; logging is off when unset.
    #[arg(long, env = "TASKMASTER_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse checklist documents and merge their tasks into the store.
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Add a task by hand.
    Add {
        title: String,
        #[arg(long, default_value = "pending")]
        status: TaskStatus,
        #[arg(long, default_value = "feature")]
        category: TaskCategory,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change fields of an existing task.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        category: Option<TaskCategory>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Complete a task, or reopen a completed one.
    Toggle { id: String },
    /// Delete a task.
    Delete { id: String },
    /// List tasks.
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print counters.
    Stats,
    /// Write the whole store as a JSON snapshot.
    ExportSnapshot {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the store with the tasks of a JSON snapshot.
    ImportSnapshot { file: PathBuf },
    /// Write the filtered tasks as a checklist document.
    ExportChecklist {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Case-insensitive match on title, notes or source.
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    status: Option<TaskStatus>,
    #[arg(long)]
    category: Option<TaskCategory>,
    /// title|status|category|phase|task-number|source|date-added|last-updated
    #[arg(long)]
    sort: Option<SortColumn>,
    /// Sort descending.
    #[arg(long, requires = "sort")]
    desc: bool,
}

impl FilterArgs {
    fn to_query(&self) -> TaskQuery {
        TaskQuery {
            search: self.search.clone(),
            status: self.status,
            category: self.category,
            sort: self.sort.map(|column| TaskSort {
                column,
                direction: if self.desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            }),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let mut service = TaskService::open(SqliteSnapshotRepository::new(&conn));
    execute(cli.command, &mut service)
}

/// What a command did to the store.
#[derive(Debug)]
enum Outcome {
    Unchanged,
    Changed,
    /// Some work was applied; the error is reported after saving it.
    PartlyFailed(anyhow::Error),
}

/// Runs one command and persists once if it changed anything.
fn execute<R: SnapshotRepository>(command: Command, service: &mut TaskService<R>) -> Result<()> {
    let deferred = match run(command, service)? {
        Outcome::Unchanged => return Ok(()),
        Outcome::Changed => None,
        Outcome::PartlyFailed(err) => Some(err),
    };
    service
        .persist()
        .context("changes were applied but could not be saved")?;
    deferred.map_or(Ok(()), Err)
}

fn run<R: SnapshotRepository>(command: Command, service: &mut TaskService<R>) -> Result<Outcome> {
    match command {
        Command::Import { files } => import_files(service, &files),
        Command::Add {
            title,
            status,
            category,
            notes,
        } => {
            if title.trim().is_empty() {
                bail!("task title must not be empty");
            }
            let candidate = TaskCandidate::manual(title)
                .with_status(status)
                .with_category(category)
                .with_notes(notes.unwrap_or_default());
            let task = service.add_task(candidate);
            println!("added {}", task.id);
            Ok(Outcome::Changed)
        }
        Command::Update {
            id,
            title,
            status,
            category,
            notes,
        } => {
            let patch = TaskPatch {
                title,
                status,
                category,
                notes,
            };
            if patch.is_empty() {
                bail!("nothing to update; pass at least one of --title, --status, --category, --notes");
            }
            let task = service.update_task(&TaskId::from(id), patch)?;
            print_task(&task);
            Ok(Outcome::Changed)
        }
        Command::Toggle { id } => {
            let task = service.toggle_task(&TaskId::from(id))?;
            print_task(&task);
            Ok(Outcome::Changed)
        }
        Command::Delete { id } => {
            let id = TaskId::from(id);
            if !service.delete_task(&id) {
                bail!("task not found: {id}");
            }
            println!("deleted {id}");
            Ok(Outcome::Changed)
        }
        Command::List { filter } => {
            for task in service.list_tasks(&filter.to_query()) {
                print_task(task);
            }
            Ok(Outcome::Unchanged)
        }
        Command::Stats => {
            let stats = service.stats();
            println!("total:        {}", stats.total);
            println!("completed:    {}", stats.completed);
            println!("in-progress:  {}", stats.in_progress);
            println!("pending:      {}", stats.pending);
            println!("bugs:         {}", stats.bugs);
            println!("completion:   {}%", stats.completion_rate);
            Ok(Outcome::Unchanged)
        }
        Command::ExportSnapshot { out } => {
            let json = service.export_snapshot_json()?;
            let path = out.unwrap_or_else(|| PathBuf::from(snapshot_file_name(today())));
            write_file(&path, &json)?;
            println!("exported {} tasks to {}", service.store().len(), path.display());
            Ok(Outcome::Unchanged)
        }
        Command::ImportSnapshot { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read `{}`", file.display()))?;
            let count = service
                .import_snapshot_json(&text)
                .with_context(|| format!("failed to import `{}`", file.display()))?;
            println!("imported {count} tasks");
            Ok(Outcome::Changed)
        }
        Command::ExportChecklist { filter, out } => {
            let rendered = service.export_checklist(&filter.to_query(), today())?;
            let path = out.unwrap_or_else(|| PathBuf::from(checklist_file_name(today())));
            write_file(&path, &rendered)?;
            println!("exported checklist to {}", path.display());
            Ok(Outcome::Unchanged)
        }
    }
}

/// Imports every readable file; unreadable ones are skipped and reported.
fn import_files<R: SnapshotRepository>(
    service: &mut TaskService<R>,
    files: &[PathBuf],
) -> Result<Outcome> {
    let mut total = ReconcileSummary::default();
    let mut imported = 0usize;
    let mut unreadable = Vec::new();

    for file in files {
        match fs::read_to_string(file) {
            Ok(text) => {
                let source = source_name(file);
                let summary = service.import_document(&text, &source);
                println!("{}", summary.describe(&source));
                total += summary;
                imported += 1;
            }
            Err(err) => {
                eprintln!("skipped `{}`: {err}", file.display());
                unreadable.push(file.display().to_string());
            }
        }
    }

    if imported > 1 {
        println!("{}", total.describe(&format!("{imported} documents")));
    }
    if unreadable.is_empty() {
        return Ok(Outcome::Changed);
    }
    let failure = anyhow!(
        "failed to read {} of {} files: {}",
        unreadable.len(),
        files.len(),
        unreadable.join(", ")
    );
    if imported == 0 {
        return Err(failure);
    }
    Ok(Outcome::PartlyFailed(failure))
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let Some(log_dir) = &cli.log_dir else {
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.clone()
    } else {
        std::env::current_dir()
            .context("failed to resolve current directory")?
            .join(log_dir)
    };
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = log_dir
        .to_str()
        .with_context(|| format!("log directory `{}` is not valid UTF-8", log_dir.display()))?;
    init_logging(level, log_dir)?;
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );
    Ok(())
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write `{}`", path.display()))
}

fn today() -> chrono::NaiveDate {
    Local::now().date_naive()
}

fn print_task(task: &Task) {
    let context = [task.phase.as_deref(), task.task_number.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" / ");
    println!(
        "{}  [{}] {:<11} {}  ({}{})",
        task.id,
        task.category,
        task.status.as_str(),
        task.title,
        task.source,
        if context.is_empty() {
            String::new()
        } else {
            format!("; {context}")
        }
    );
}

#[cfg(test)]
mod tests {
    use super::{execute, Command};
    use std::fs;
    use taskmaster_core::db::open_db_in_memory;
    use taskmaster_core::{SqliteSnapshotRepository, TaskService};

    #[test]
    fn import_saves_readable_documents_when_a_later_file_is_missing() {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let good = dir.path().join("a.md");
        let missing = dir.path().join("missing.md");
        fs::write(&good, "## Setup\n- [ ] Init repo\n").expect("fixture should be writable");
        let conn = open_db_in_memory().expect("in-memory db should open");

        {
            let mut service = TaskService::open(SqliteSnapshotRepository::new(&conn));
            let err = execute(
                Command::Import {
                    files: vec![good, missing],
                },
                &mut service,
            )
            .expect_err("missing file should be reported");
            assert!(err.to_string().contains("missing.md"), "unexpected error: {err}");
        }

        let reopened = TaskService::open(SqliteSnapshotRepository::new(&conn));
        assert_eq!(reopened.store().len(), 1);
        assert_eq!(reopened.store().tasks()[0].source, "a.md");
    }

    #[test]
    fn import_with_no_readable_file_fails_without_saving() {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let conn = open_db_in_memory().expect("in-memory db should open");
        let mut service = TaskService::open(SqliteSnapshotRepository::new(&conn));

        execute(
            Command::Import {
                files: vec![dir.path().join("nope.md")],
            },
            &mut service,
        )
        .expect_err("unreadable input should fail");

        let saved: i64 = conn
            .query_row("SELECT COUNT(*) FROM task_snapshots;", [], |row| row.get(0))
            .expect("snapshot table should be queryable");
        assert_eq!(saved, 0);
    }
}
