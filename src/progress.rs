//! Progress reporting for bakes.
//!
//! A bake reports each entry it visits and each class the transformer
//! changed. Every callback has a no-op default, so an observer implements
//! only what it displays.
//!
//! # Example
//!
//! ```rust,no_run
//! use prebake::progress::StatisticsProgress;
//! use prebake::{BakeOptions, PassThrough, bake_path, config::AppliedConfigs};
//!
//! let options = BakeOptions::default().progress(StatisticsProgress::new());
//! bake_path("in.jar", "out.jar", &mut PassThrough, &AppliedConfigs::new(), options)?;
//! # Ok::<(), prebake::Error>(())
//! ```

use std::time::{Duration, Instant};

/// Observer of a running bake.
pub trait BakeProgress: Send {
    /// Called once before the first entry with the number of input entries.
    fn on_start(&mut self, total_entries: usize) {
        let _ = total_entries;
    }

    /// Called when an input entry is picked up.
    fn on_entry_start(&mut self, path: &str, size: u64) {
        let _ = (path, size);
    }

    /// Called when the transformer changed a class.
    fn on_class_transformed(&mut self, class_name: &str) {
        let _ = class_name;
    }

    /// Called when an input entry was written or dropped.
    fn on_entry_complete(&mut self, path: &str) {
        let _ = path;
    }

    /// Called after the applied configurations entry was written.
    fn on_finish(&mut self) {}
}

/// A progress reporter that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl BakeProgress for NoProgress {}

/// Collects counts and the names of transformed classes.
#[derive(Debug, Clone)]
pub struct StatisticsProgress {
    /// Number of input entries announced by [`BakeProgress::on_start`].
    pub total_entries: usize,
    /// Entries completed so far.
    pub entries_processed: usize,
    /// Entry currently being processed.
    pub current_entry: Option<String>,
    /// Classes the transformer changed, in archive order.
    pub transformed: Vec<String>,
    /// Whether the bake ran to completion.
    pub finished: bool,
    start_time: Instant,
}

impl Default for StatisticsProgress {
    fn default() -> Self {
        Self {
            total_entries: 0,
            entries_processed: 0,
            current_entry: None,
            transformed: Vec::new(),
            finished: false,
            start_time: Instant::now(),
        }
    }
}

impl StatisticsProgress {
    /// Creates a new statistics reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Completion percentage (0.0 - 100.0) by entry count.
    pub fn percentage(&self) -> f64 {
        if self.total_entries == 0 {
            0.0
        } else {
            (self.entries_processed as f64 / self.total_entries as f64) * 100.0
        }
    }

    /// Time since the reporter was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl BakeProgress for StatisticsProgress {
    fn on_start(&mut self, total_entries: usize) {
        self.total_entries = total_entries;
    }

    fn on_entry_start(&mut self, path: &str, _size: u64) {
        self.current_entry = Some(path.to_string());
    }

    fn on_class_transformed(&mut self, class_name: &str) {
        self.transformed.push(class_name.to_string());
    }

    fn on_entry_complete(&mut self, _path: &str) {
        self.entries_processed += 1;
        self.current_entry = None;
    }

    fn on_finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_progress() {
        let mut p = NoProgress;
        p.on_start(3);
        p.on_entry_start("a", 1);
        p.on_class_transformed("a.B");
        p.on_entry_complete("a");
        p.on_finish();
    }

    #[test]
    fn test_statistics_progress() {
        let mut p = StatisticsProgress::new();
        p.on_start(2);
        p.on_entry_start("a/B.class", 10);
        assert_eq!(p.current_entry.as_deref(), Some("a/B.class"));
        p.on_class_transformed("a.B");
        p.on_entry_complete("a/B.class");
        assert!(p.current_entry.is_none());
        assert!((p.percentage() - 50.0).abs() < f64::EPSILON);
        assert_eq!(p.transformed, ["a.B"]);
        assert!(!p.finished);
        p.on_finish();
        assert!(p.finished);
    }

    #[test]
    fn test_statistics_empty() {
        assert_eq!(StatisticsProgress::new().percentage(), 0.0);
    }
}
