//! CLI tool for baking mixins into a jar.

mod commands;
mod exit_codes;
mod progress;

use clap::Parser;
use std::path::PathBuf;

/// Printed when fewer than three jars are given.
const USAGE: &str = "usage: prebake <input-jar> <output-jar> <mod-jars...>";

/// Bake mixins into a jar ahead of time
#[derive(Parser)]
#[command(name = "prebake")]
#[command(author, version, about = "Bake mixins into a jar ahead of time", long_about = None)]
pub struct Cli {
    /// Jar to bake
    input: Option<PathBuf>,

    /// Where to write the baked jar
    output: Option<PathBuf>,

    /// Mod jars whose mixin configurations are applied
    mods: Vec<PathBuf>,

    /// Transformer command, run once per class with the class name appended
    #[arg(long, short = 't', env = "PREBAKE_TRANSFORMER")]
    transformer: Option<String>,

    /// Compression level for rewritten entries (0-9)
    #[arg(long, short = 'l', default_value = "6", value_parser = clap::value_parser!(u32).range(0..=9))]
    level: u32,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn main() {
    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();

    if usage_needed(&cli) {
        println!("{}", USAGE);
        return;
    }
    let (Some(input), Some(output)) = (cli.input.as_deref(), cli.output.as_deref()) else {
        return;
    };

    let exit_code = commands::bake(&commands::BakeConfig {
        input,
        output,
        mods: &cli.mods,
        transformer: cli.transformer.as_deref(),
        level: cli.level,
        quiet: cli.quiet,
    });

    std::process::exit(exit_code.code());
}

/// True when fewer than three jars were given; usage is printed and the
/// tool exits successfully.
fn usage_needed(cli: &Cli) -> bool {
    cli.input.is_none() || cli.output.is_none() || cli.mods.is_empty()
}
