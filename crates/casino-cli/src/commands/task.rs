//! Task pool commands for CLI.

use casino_core::storage::CasinoStore;
use casino_core::task::{CategoryUpdate, SUGGESTED_CATEGORIES};
use casino_core::{CasinoDb, Config, PoolSummary, Session, Task, TaskStatus, TaskUpdate};
use clap::Subcommand;

use super::{print_json, BoxError, CliResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to your pool (your partner will spin for it)
    Add {
        /// Task text
        text: String,
        /// Category (see `task categories` for suggestions)
        #[arg(long)]
        category: Option<String>,
    },
    /// List your tasks, newest first
    List {
        /// Filter by status: available, in_progress or completed
        #[arg(long)]
        status: Option<String>,
    },
    /// Edit one of your tasks
    Edit {
        /// Task ID
        id: String,
        /// New text
        #[arg(long)]
        text: Option<String>,
        /// New category
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,
        /// Remove the category
        #[arg(long)]
        clear_category: bool,
    },
    /// Delete one of your tasks
    Delete {
        /// Task ID
        id: String,
    },
    /// Pool counts by status
    Summary,
    /// Suggested categories
    Categories,
}

/// Load a task and check the acting user owns it.
fn owned_task(db: &CasinoDb, session: &Session, id: &str) -> Result<Task, BoxError> {
    match db.get_task(id)? {
        Some(task) if task.user_id == session.user_id() => Ok(task),
        _ => Err(format!("task not found: {id}").into()),
    }
}

pub fn run(ctx: &Context, action: TaskAction) -> CliResult {
    if let TaskAction::Categories = action {
        for category in SUGGESTED_CATEGORIES {
            println!("{category}");
        }
        return Ok(());
    }

    let db = CasinoDb::open()?;
    let config = Config::load()?;
    let session = ctx.session(&db, &config)?;

    match action {
        TaskAction::Add { text, category } => {
            let task = Task::new(session.user_id(), &text, category.as_deref())?;
            db.insert_task(&task)?;
            print_json(&task)?;
        }
        TaskAction::List { status } => {
            let status = status
                .map(|s| TaskStatus::parse(&s).ok_or_else(|| format!("unknown status: {s}")))
                .transpose()?;
            let tasks = db.list_tasks(session.user_id(), status)?;
            print_json(&tasks)?;
        }
        TaskAction::Edit {
            id,
            text,
            category,
            clear_category,
        } => {
            let mut task = owned_task(&db, &session, &id)?;
            let update = TaskUpdate {
                text,
                category: match (category, clear_category) {
                    (_, true) => CategoryUpdate::Clear,
                    (Some(category), false) => CategoryUpdate::Set(category),
                    (None, false) => CategoryUpdate::Keep,
                },
            };
            task.apply(&update)?;
            db.update_task(&task)?;
            print_json(&task)?;
        }
        TaskAction::Delete { id } => {
            let task = owned_task(&db, &session, &id)?;
            db.delete_task(&task.id)?;
            println!("Task deleted: {id}");
        }
        TaskAction::Summary => {
            let tasks = db.list_tasks(session.user_id(), None)?;
            print_json(&PoolSummary::from_tasks(&tasks))?;
        }
        TaskAction::Categories => {}
    }
    Ok(())
}
