// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/logging.rs
// Version: 1.0.0
//
// This file installs the log4rs backend behind the `log` facade. Records go
// to stderr so command output on stdout stays machine-readable; a file
// appender is added when a log file is configured.
//
// Tree Location:
// - src/logging.rs (logging setup)
// - Depends on: log, log4rs, anyhow

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

const CONSOLE_PATTERN: &str = "{d(%H:%M:%S)} {h({l:5})} {t} - {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:5} [{t}] {m}{n}";

/// Build the log4rs configuration for `level`, optionally appending to `log_file`.
pub fn logging_config(level: LevelFilter, log_file: Option<&Path>) -> Result<Config> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let mut builder = Config::builder().appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");

    if let Some(path) = log_file {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
            .build(path)
            .with_context(|| format!("Could not open log file {:?}", path))?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    builder
        .build(root.build(level))
        .context("Invalid logging configuration")
}

/// Install the global logger. Fails if a logger is already installed.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let config = logging_config(level, log_file)?;
    log4rs::init_config(config).context("Could not set up logging")?;
    Ok(())
}
