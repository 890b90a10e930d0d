//! Task command implementations: list, show, new, edit, toggle, rm.

use serde::Serialize;

use crate::cli::{load_context, GlobalOptions};
use crate::error::Result;
use crate::output::{emit_success, task_line, HumanOutput};
use crate::query::{parse_due_date, SortKey, SortOrder, TaskFilter, TaskSort};
use crate::task::{Task, TaskStatus};
use crate::validate::{self, NewTaskInput, TaskPatchInput};

pub(crate) struct ListOptions {
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub globals: GlobalOptions,
}

pub(crate) struct ShowOptions {
    pub id: String,
    pub globals: GlobalOptions,
}

pub(crate) struct NewOptions {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub category: Option<String>,
    pub globals: GlobalOptions,
}

pub(crate) struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due: Option<String>,
    pub category: Option<String>,
    pub globals: GlobalOptions,
}

pub(crate) struct ToggleOptions {
    pub id: String,
    pub globals: GlobalOptions,
}

pub(crate) struct RmOptions {
    pub id: String,
    pub globals: GlobalOptions,
}

#[derive(Serialize)]
struct TaskListOutput {
    tasks: Vec<Task>,
    total: usize,
    sort: TaskSort,
}

#[derive(Serialize)]
struct DeleteOutput {
    id: String,
    deleted: bool,
}

pub(crate) fn run_list(options: ListOptions) -> Result<()> {
    let status = options
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;
    let filter = TaskFilter {
        status,
        category: options.category,
        search: options.search,
    };

    let ctx = load_context(&options.globals)?;
    let sort = resolve_sort(
        ctx.config.list.task_sort()?,
        options.sort.as_deref(),
        options.order.as_deref(),
    )?;
    let tasks = ctx.store.list_sorted(&filter, sort)?;

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", tasks.len().to_string());
    human.push_summary("Sort", format!("{} {}", sort.key, sort.order));
    if let Some(status) = filter.status {
        human.push_summary("Status", status.as_str());
    }
    if let Some(category) = filter.category.as_deref() {
        human.push_summary("Category", category);
    }
    if let Some(search) = filter.search.as_deref() {
        human.push_summary("Search", search);
    }
    for task in &tasks {
        human.push_detail(task_line(task));
        warn_unparseable_due(&mut human, task);
    }
    if tasks.is_empty() && filter.is_empty() {
        human.push_next_step("taskstore new \"<title>\"");
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks,
        sort,
    };
    emit_success(options.globals.output(), "list", &output, Some(&human))
}

pub(crate) fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(&options.globals)?;
    let task = ctx.store.require(&options.id)?;

    let mut human = HumanOutput::new("Task");
    human.push_task(&task);
    emit_success(options.globals.output(), "show", &task, Some(&human))
}

pub(crate) fn run_new(options: NewOptions) -> Result<()> {
    let fields = validate::new_task(NewTaskInput {
        title: options.title,
        description: options.description,
        due_date: options.due,
        category: options.category,
    })?;

    let ctx = load_context(&options.globals)?;
    let task = ctx.store.create(fields)?;

    let mut human = HumanOutput::new("Task created");
    human.push_task(&task);
    warn_unparseable_due(&mut human, &task);
    human.push_next_step(format!("taskstore toggle {}", task.id));
    emit_success(options.globals.output(), "new", &task, Some(&human))
}

pub(crate) fn run_edit(options: EditOptions) -> Result<()> {
    let patch = validate::task_patch(TaskPatchInput {
        title: options.title,
        description: options.description,
        status: options.status,
        due_date: options.due,
        category: options.category,
    })?;

    let ctx = load_context(&options.globals)?;
    let task = ctx.store.update(&options.id, patch)?;

    let mut human = HumanOutput::new("Task updated");
    human.push_task(&task);
    warn_unparseable_due(&mut human, &task);
    emit_success(options.globals.output(), "edit", &task, Some(&human))
}

pub(crate) fn run_toggle(options: ToggleOptions) -> Result<()> {
    let ctx = load_context(&options.globals)?;
    let task = ctx.store.toggle(&options.id)?;

    let header = if task.is_completed() {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    human.push_task(&task);
    emit_success(options.globals.output(), "toggle", &task, Some(&human))
}

pub(crate) fn run_rm(options: RmOptions) -> Result<()> {
    let ctx = load_context(&options.globals)?;
    ctx.store.delete(&options.id)?;

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", options.id.clone());
    let output = DeleteOutput {
        id: options.id,
        deleted: true,
    };
    emit_success(options.globals.output(), "rm", &output, Some(&human))
}

/// Due dates are stored as given; flag ones that will sort as undated.
fn warn_unparseable_due(human: &mut HumanOutput, task: &Task) {
    if let Some(due_date) = task.due_date.as_deref() {
        if !due_date.trim().is_empty() && parse_due_date(due_date).is_none() {
            human.push_warning(format!(
                "task {}: due date \"{due_date}\" is not a date and sorts as undated",
                task.id
            ));
        }
    }
}

/// Flags override the configured default; a lone `--order` keeps the default key.
fn resolve_sort(default: TaskSort, key: Option<&str>, order: Option<&str>) -> Result<TaskSort> {
    let key = match key {
        Some(value) => value.parse::<SortKey>()?,
        None => default.key,
    };
    let order = match order {
        Some(value) => value.parse::<SortOrder>()?,
        None => default.order,
    };
    Ok(TaskSort::new(key, order))
}
