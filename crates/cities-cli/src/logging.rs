// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

/// Opens (creating if needed) the append-only log file.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

/// Routes `log` records to `path` so they never draw over the terminal UI.
/// `RUST_LOG` takes precedence over `level`.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    let file = open_log_file(path)?;
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("install logger")
}
