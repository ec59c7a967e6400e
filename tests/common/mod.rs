#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sheet_cleaner::data::{Value, type_raw_column};
use sheet_cleaner::table::{Column, Table};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Column whose cells are typed the same way delimited input is.
pub fn raw_column(name: &str, values: &[&str]) -> Column {
    Column::new(name, type_raw_column(values))
}

pub fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub fn table(columns: Vec<Column>) -> Table {
    Table::new(columns).expect("valid table")
}

pub fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
