//! Command-line interface for taskstore
//!
//! This module defines the CLI structure using clap derive macros.
//! Each group of subcommands is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::TaskStore;

mod init;
mod task;

/// taskstore - file-backed task tracking
///
/// Create, filter, sort, edit, complete and delete tasks kept in a single
/// JSON document.
#[derive(Parser, Debug)]
#[command(name = "taskstore")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the JSON document (overrides store.path from config)
    #[arg(long, global = true, env = "TASKSTORE_DB")]
    pub db: Option<PathBuf>,

    /// Path to a taskstore.toml config file
    #[arg(long, global = true, env = "TASKSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the store (or verify an existing one)
    Init {
        /// Also write a taskstore.toml with the effective settings
        #[arg(long)]
        write_config: bool,
    },

    /// List tasks
    #[command(visible_alias = "ls")]
    List {
        /// Only tasks with this status: open, completed
        #[arg(long)]
        status: Option<String>,

        /// Only tasks in this category (exact match)
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive text to find in title or description
        #[arg(long)]
        search: Option<String>,

        /// Sort key: dueDate, createdAt, title
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction: asc, desc
        #[arg(long)]
        order: Option<String>,
    },

    /// Show a single task
    Show {
        /// Task id
        id: String,
    },

    /// Create a task
    New {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Category label
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Change fields of a task
    Edit {
        /// Task id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description (empty string clears the text)
        #[arg(short, long)]
        description: Option<String>,

        /// New status: open, completed
        #[arg(long)]
        status: Option<String>,

        /// New due date
        #[arg(long)]
        due: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Flip a task between open and completed
    Toggle {
        /// Task id
        id: String,
    },

    /// Delete a task
    #[command(visible_alias = "delete")]
    Rm {
        /// Task id
        id: String,
    },

    /// Show store health and counts
    Info,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let globals = GlobalOptions {
            db: self.db,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init { write_config } => init::run_init(globals, write_config),
            Commands::Info => init::run_info(globals),
            Commands::List {
                status,
                category,
                search,
                sort,
                order,
            } => task::run_list(task::ListOptions {
                status,
                category,
                search,
                sort,
                order,
                globals,
            }),
            Commands::Show { id } => task::run_show(task::ShowOptions { id, globals }),
            Commands::New {
                title,
                description,
                due,
                category,
            } => task::run_new(task::NewOptions {
                title,
                description,
                due,
                category,
                globals,
            }),
            Commands::Edit {
                id,
                title,
                description,
                status,
                due,
                category,
            } => task::run_edit(task::EditOptions {
                id,
                title,
                description,
                status,
                due,
                category,
                globals,
            }),
            Commands::Toggle { id } => task::run_toggle(task::ToggleOptions { id, globals }),
            Commands::Rm { id } => task::run_rm(task::RmOptions { id, globals }),
        }
    }
}

/// Flags shared by every subcommand
#[derive(Debug, Clone)]
pub(crate) struct GlobalOptions {
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> crate::output::OutputOptions {
        crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

pub(crate) struct StoreContext {
    pub store: TaskStore,
    pub config: Config,
}

/// Resolve configuration and open the store
pub(crate) fn load_context(globals: &GlobalOptions) -> Result<StoreContext> {
    let config = load_config(globals)?;
    let store = TaskStore::open_with(document_path(globals, &config), config.store_options())?;
    Ok(StoreContext { store, config })
}

/// `--db` wins over `store.path`
pub(crate) fn document_path(globals: &GlobalOptions, config: &Config) -> PathBuf {
    globals
        .db
        .clone()
        .unwrap_or_else(|| config.store.path.clone())
}

pub(crate) fn load_config(globals: &GlobalOptions) -> Result<Config> {
    match globals.config.as_deref() {
        Some(path) => {
            if !path.is_file() {
                return Err(Error::InvalidConfig(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Config::load(path)
        }
        None => Ok(Config::load_from_dir(&std::env::current_dir()?)),
    }
}
