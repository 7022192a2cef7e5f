// External solver process
// Runs a two-phase solver binary with the facelet string as its last argument

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{CubeSolver, SolverError};
use crate::config::SolverConfig;
use crate::cube::{CubeState, MoveSequence};

/// How often a running solver is checked for completion when a timeout is set
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Solver backed by an external program such as the `kociemba` CLI
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    command: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessSolver {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        let timeout = (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms));
        Self::new(config.command.clone(), config.args.clone(), timeout)
    }

    fn spawn(&self, facelets: &str) -> Result<Child, SolverError> {
        Command::new(&self.command)
            .args(&self.args)
            .arg(facelets)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SolverError::Spawn {
                command: self.command.clone(),
                source,
            })
    }

    /// Wait for the child, killing it once the deadline passes
    fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, SolverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                // The child may exit between try_wait and kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(SolverError::Timeout(timeout.as_millis()));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl CubeSolver for ProcessSolver {
    fn solve(&self, state: &CubeState) -> Result<MoveSequence, SolverError> {
        let mut child = self.spawn(state.as_str())?;

        // Both pipes are read while the child runs so a full pipe never stalls it
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            Some(timeout) => Self::wait_with_deadline(&mut child, timeout)?,
            None => child.wait()?,
        };

        interpret_output(status, &collect(stdout)?, &collect(stderr)?)
    }
}

/// Read a pipe to the end on its own thread
///
/// On timeout the handle is dropped unjoined; the thread ends once the
/// killed solver's pipe closes.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(reader: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<String, SolverError> {
    let bytes = reader
        .join()
        .map_err(|_| SolverError::Internal("solver output reader panicked".to_string()))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Map the solver's exit status and output to a move sequence or an error
fn interpret_output(
    status: ExitStatus,
    stdout: &str,
    stderr: &str,
) -> Result<MoveSequence, SolverError> {
    if !status.success() {
        return Err(SolverError::Exited {
            status: status.to_string(),
            message: last_line(stderr)
                .or_else(|| last_line(stdout))
                .unwrap_or("no output")
                .to_string(),
        });
    }

    let output = stdout.trim();
    if output
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("error"))
    {
        return Err(SolverError::Rejected(output.to_string()));
    }

    Ok(output.parse()?)
}

/// Last non-blank line, which for tracebacks is the error itself
fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rev().find(|l| !l.is_empty())
}
