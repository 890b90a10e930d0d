//! Input validation applied by callers before they reach the store.
//!
//! The store itself accepts whatever it is given; these checks turn raw user
//! input into `NewTask` / `TaskPatch` values and reject bad input with
//! `Error::InvalidArgument`.

use crate::error::{Error, Result};
use crate::task::{NewTask, TaskPatch, TaskStatus};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_CATEGORY_LEN: usize = 50;

/// Raw fields for a new task
#[derive(Debug, Clone, Default)]
pub struct NewTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

/// Raw fields for an update
#[derive(Debug, Clone, Default)]
pub struct TaskPatchInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

pub fn new_task(input: NewTaskInput) -> Result<NewTask> {
    let title = title(&input.title)?;
    let description = input
        .description
        .map(|value| bounded("Description", &value, MAX_DESCRIPTION_LEN))
        .transpose()?
        .filter(|value| !value.is_empty());
    let category = input
        .category
        .map(|value| bounded("Category", &value, MAX_CATEGORY_LEN))
        .transpose()?
        .filter(|value| !value.is_empty());
    let due_date = input
        .due_date
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    Ok(NewTask {
        title,
        description,
        due_date,
        category,
    })
}

/// Present fields are kept even when empty so they replace the stored value.
pub fn task_patch(input: TaskPatchInput) -> Result<TaskPatch> {
    let patch = TaskPatch {
        title: input.title.as_deref().map(title).transpose()?,
        description: input
            .description
            .map(|value| bounded("Description", &value, MAX_DESCRIPTION_LEN))
            .transpose()?,
        status: input
            .status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()?,
        due_date: input.due_date.map(|value| value.trim().to_string()),
        category: input
            .category
            .map(|value| bounded("Category", &value, MAX_CATEGORY_LEN))
            .transpose()?,
    };

    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "at least one field must be provided".to_string(),
        ));
    }
    Ok(patch)
}

fn title(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(
            "Title is required and must be a non-empty string".to_string(),
        ));
    }
    bounded("Title", trimmed, MAX_TITLE_LEN)
}

fn bounded(field: &str, value: &str, max: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(Error::InvalidArgument(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}
