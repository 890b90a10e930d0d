//! taskstore init and info command implementations
//!
//! `init` creates the backing document (and optionally a config file);
//! `info` reports store health.

use std::path::PathBuf;

use crate::cli::{document_path, load_config, load_context, GlobalOptions};
use crate::config::CONFIG_FILE;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

#[derive(serde::Serialize)]
struct InitReport {
    path: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    document: bool,
    config: bool,
}

pub(crate) fn run_init(globals: GlobalOptions, write_config: bool) -> Result<()> {
    let config = load_config(&globals)?;
    let created_document = !document_path(&globals, &config).is_file();

    let ctx = load_context(&globals)?;

    // An explicit --config already exists (it was just loaded).
    let config_path = PathBuf::from(CONFIG_FILE);
    let created_config = if write_config && globals.config.is_none() && !config_path.exists() {
        let mut config = ctx.config.clone();
        config.store.path = ctx.store.path().to_path_buf();
        config.save(&config_path)?;
        true
    } else {
        false
    };

    let report = InitReport {
        path: ctx.store.path().to_path_buf(),
        created: InitCreated {
            document: created_document,
            config: created_config,
        },
    };

    let mut human = HumanOutput::new("taskstore initialized");
    human.push_summary("Store", ctx.store.path().display().to_string());
    if created_config {
        human.push_summary("Config", config_path.display().to_string());
    }
    human.push_next_step("taskstore new \"<title>\"");

    emit_success(globals.output(), "init", &report, Some(&human))
}

pub(crate) fn run_info(globals: GlobalOptions) -> Result<()> {
    let ctx = load_context(&globals)?;
    let info = ctx.store.info()?;

    let mut human = HumanOutput::new("Store info");
    human.push_summary("Status", info.status);
    human.push_summary("Path", info.path.display().to_string());
    human.push_summary("Version", info.version.clone());
    human.push_summary("Created", info.created_at.to_rfc3339());
    human.push_summary("Total", info.total.to_string());
    human.push_summary("Open", info.open.to_string());
    human.push_summary("Completed", info.completed.to_string());

    emit_success(globals.output(), "info", &info, Some(&human))
}
