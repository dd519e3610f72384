use crate::{SweepError, ToolExit};
use log::debug;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub const DEFAULT_RUNNER: &str = "./bin/runner";

/// Something that executes one benchmark configuration to completion.
pub trait BenchmarkRunner {
    fn run(&mut self, config: &str) -> Result<ToolExit, SweepError>;
}

/// Starts `<program> -` and feeds the configuration on its standard input.
///
/// The runner's own output goes straight to our stdout and stderr.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    pub program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessRunner {
            program: program.into(),
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        ProcessRunner::new(DEFAULT_RUNNER)
    }
}

impl BenchmarkRunner for ProcessRunner {
    fn run(&mut self, config: &str) -> Result<ToolExit, SweepError> {
        let program = self.program.display().to_string();
        debug!("Starting {} with config {}", program, config);
        let mut child = Command::new(&self.program)
            .arg("-")
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| SweepError::io(format!("failed to start {}", program), e))?;
        // Dropping stdin closes it, the runner reads until EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(config.as_bytes()),
            None => Ok(()),
        };
        // The child is reaped even if the write failed.
        let status = child
            .wait()
            .map_err(|e| SweepError::io(format!("failed to wait for {}", program), e))?;
        match written {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("{} closed its input before reading the whole config", program);
            }
            Err(e) => {
                return Err(SweepError::io(
                    format!("failed to write config to {}", program),
                    e,
                ));
            }
            Ok(()) => {}
        }
        Ok(status.into())
    }
}
