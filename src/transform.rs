//! Class transformer interface.
//!
//! The bake does not know how classes are transformed. It hands each class
//! to a [`Transformer`] and only cares whether the result differs from the
//! input, which the transformer reports explicitly through
//! [`Transformation`].

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::ConfigRegistrar;
use crate::{Error, Result};

/// Environment variable through which [`CommandTransformer`] passes the
/// registered configurations, one per line.
pub const CONFIGS_ENV: &str = "PREBAKE_MIXIN_CONFIGS";

/// Result of transforming one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    /// No rule applied; the original bytes stand.
    Unchanged,
    /// The class was rewritten.
    Changed(Vec<u8>),
}

impl Transformation {
    /// Returns true for [`Transformation::Changed`].
    pub fn is_changed(&self) -> bool {
        matches!(self, Transformation::Changed(_))
    }
}

/// Transforms classes one at a time.
///
/// Called once per class, in archive order. `name` and `transformed_name`
/// are dotted class names; a bake never renames classes and passes the same
/// name for both.
pub trait Transformer {
    /// Transforms one class.
    fn transform(
        &mut self,
        name: &str,
        transformed_name: &str,
        class: &[u8],
    ) -> Result<Transformation>;
}

impl<T: Transformer + ?Sized> Transformer for &mut T {
    fn transform(
        &mut self,
        name: &str,
        transformed_name: &str,
        class: &[u8],
    ) -> Result<Transformation> {
        (**self).transform(name, transformed_name, class)
    }
}

impl<T: Transformer + ?Sized> Transformer for Box<T> {
    fn transform(
        &mut self,
        name: &str,
        transformed_name: &str,
        class: &[u8],
    ) -> Result<Transformation> {
        (**self).transform(name, transformed_name, class)
    }
}

/// A transformer that changes nothing and accepts every configuration.
///
/// Baking with it re-packs the input and records the applied configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Transformer for PassThrough {
    fn transform(&mut self, _: &str, _: &str, _: &[u8]) -> Result<Transformation> {
        Ok(Transformation::Unchanged)
    }
}

impl ConfigRegistrar for PassThrough {
    fn add_configuration(&mut self, _: &str) -> Result<()> {
        Ok(())
    }
}

/// Runs an external program for every class.
///
/// The program is invoked as `<program> [args...] <class-name>` with the
/// class bytes on standard input. It must exit with status 0 and either
/// print nothing (class unchanged) or print the complete transformed class
/// to standard output. Any other exit status fails the bake.
///
/// Configurations registered before the bake starts are passed to every
/// invocation in [`CONFIGS_ENV`].
#[derive(Debug, Clone)]
pub struct CommandTransformer {
    program: PathBuf,
    args: Vec<OsString>,
    configs: Vec<String>,
}

impl CommandTransformer {
    /// Creates a transformer running `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            configs: Vec::new(),
        }
    }

    /// Splits a command line on whitespace into a program and its leading
    /// arguments. Quoting is not interpreted.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program).args(words))
    }

    /// Appends an argument placed before the class name.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments placed before the class name.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Configurations registered so far.
    pub fn configs(&self) -> &[String] {
        &self.configs
    }

    fn failure(name: &str, reason: impl Into<String>) -> Error {
        Error::Transform {
            class_name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl Transformer for CommandTransformer {
    fn transform(
        &mut self,
        name: &str,
        transformed_name: &str,
        class: &[u8],
    ) -> Result<Transformation> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(transformed_name)
            .env(CONFIGS_ENV, self.configs.join("\n"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Self::failure(
                    name,
                    format!("failed to run {}: {}", self.program.display(), e),
                )
            })?;

        // Feed stdin from a separate thread so a child that writes before it
        // has read everything cannot deadlock against us.
        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            let feeder = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(class),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (feeder.join(), output)
        });

        let output = match output {
            (_, Err(e)) => return Err(Self::failure(name, format!("failed to wait: {}", e))),
            (_, Ok(output)) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(Self::failure(
                    name,
                    format!("{} ({})", stderr.trim(), output.status),
                ));
            }
            (Ok(Err(e)), _) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(Self::failure(name, format!("failed to write class: {}", e)));
            }
            (Err(_), _) => return Err(Self::failure(name, "stdin writer panicked")),
            (_, Ok(output)) => output,
        };

        if output.stdout.is_empty() {
            Ok(Transformation::Unchanged)
        } else {
            Ok(Transformation::Changed(output.stdout))
        }
    }
}

impl ConfigRegistrar for CommandTransformer {
    fn add_configuration(&mut self, id: &str) -> Result<()> {
        self.configs.push(id.to_string());
        Ok(())
    }
}
