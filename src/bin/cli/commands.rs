//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};

use prebake::{
    BakeOptions, BakeResult, CommandTransformer, ConfigRegistrar, PassThrough, Transformer, prebake,
};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::progress::CliProgress;

/// Configuration for the bake command.
pub struct BakeConfig<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub mods: &'a [PathBuf],
    pub transformer: Option<&'a str>,
    pub level: u32,
    pub quiet: bool,
}

/// Bake command implementation
pub fn bake(config: &BakeConfig<'_>) -> ExitCode {
    match config.transformer {
        Some(command) => match CommandTransformer::from_command_line(command) {
            Some(mut transformer) => run(config, &mut transformer),
            None => {
                eprintln!("Error: transformer command is empty");
                ExitCode::BadArgs
            }
        },
        None => run(config, &mut PassThrough),
    }
}

fn run<T>(config: &BakeConfig<'_>, transformer: &mut T) -> ExitCode
where
    T: Transformer + ConfigRegistrar,
{
    let progress = CliProgress::new(config.quiet);
    let options = BakeOptions::new()
        .level(config.level)
        .progress(progress.clone());

    match prebake(config.input, config.output, config.mods, transformer, options) {
        Ok(result) => {
            progress.finish_with_message(summary(&result));
            ExitCode::Success
        }
        Err(e) => {
            progress.abandon();
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

fn summary(result: &BakeResult) -> String {
    format!(
        "{} of {} classes transformed, {} configurations recorded",
        result.classes_transformed.len(),
        result.classes_seen,
        result.configs_written
    )
}
