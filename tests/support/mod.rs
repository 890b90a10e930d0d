#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use taskstore::task::Document;
use taskstore::TaskStore;
use tempfile::TempDir;

pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("data").join("db.json")
    }

    pub fn open(&self) -> TaskStore {
        TaskStore::open(self.db_path()).expect("open store")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_document(&self) -> Result<Document, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.db_path())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Command running the binary inside this store's directory
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskstore").expect("binary");
        cmd.current_dir(self.path());
        cmd.env_remove("TASKSTORE_DB");
        cmd.env_remove("TASKSTORE_CONFIG");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

/// Parse the JSON envelope printed by `--json`
pub fn parse_envelope(stdout: &[u8]) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(stdout)?)
}
