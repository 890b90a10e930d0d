//! taskstore - file-backed task tracking library
//!
//! Tasks live in a single JSON document on disk. The store re-reads that
//! document for every operation and rewrites it atomically after every
//! mutation, holding an exclusive file lock across the read-modify-write.
//!
//! # Core Concepts
//!
//! - **Task**: a short text record with status, optional due date and category
//! - **Document**: the whole persisted state, read and written as one unit
//! - **Filter**: status / category / text predicates combined with AND
//! - **Toggle**: flip a task between open and completed
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `taskstore.toml`
//! - `error`: Error types and result aliases
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output for CLI commands
//! - `query`: Filtering and sorting
//! - `storage`: Loading and persisting the document file
//! - `store`: The task store (CRUD + queries)
//! - `task`: Task records and the document model
//! - `validate`: Input validation for callers

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod query;
pub mod storage;
pub mod store;
pub mod task;
pub mod validate;

pub use error::{Error, Result};
pub use query::{SortKey, SortOrder, TaskFilter, TaskSort};
pub use store::{StoreOptions, TaskStore};
pub use task::{Document, NewTask, Task, TaskPatch, TaskStatus};
