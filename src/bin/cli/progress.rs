//! Progress display for the bake command.

use indicatif::{ProgressBar, ProgressStyle};
use prebake::BakeProgress;

/// Maximum entry name width shown next to the bar.
const NAME_WIDTH: usize = 48;

/// Entry counter bar that also prints one line per transformed class.
#[derive(Clone)]
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates the display; a quiet display still prints transformed classes.
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries {wide_msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        };
        Self { bar }
    }

    /// Finishes with a custom message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.bar.finish_with_message(msg.into());
    }

    /// Leaves the bar where the bake stopped
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl BakeProgress for CliProgress {
    fn on_start(&mut self, total_entries: usize) {
        self.bar.set_length(total_entries as u64);
    }

    fn on_entry_start(&mut self, path: &str, _size: u64) {
        self.bar.set_message(shorten(path));
    }

    fn on_class_transformed(&mut self, class_name: &str) {
        self.bar.suspend(|| println!("Transformed {}", class_name));
    }

    fn on_entry_complete(&mut self, _path: &str) {
        self.bar.inc(1);
    }
}

/// Keeps the tail of long entry names.
fn shorten(path: &str) -> String {
    let chars = path.chars().count();
    if chars <= NAME_WIDTH {
        return path.to_string();
    }
    let tail: String = path.chars().skip(chars - (NAME_WIDTH - 3)).collect();
    format!("...{}", tail)
}
