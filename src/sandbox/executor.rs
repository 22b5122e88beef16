//! Child process execution with hard limits
//!
//! Every program (compiler, interpreter or compiled solution) is started in
//! its own process group with resource ceilings applied between fork and
//! exec. A wall-clock deadline kills the whole group; stdout is captured up
//! to a byte cap and the group is killed as soon as the cap is crossed.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use nix::sys::resource::{setrlimit, Resource};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::timeout;

use super::SandboxError;

/// Stderr kept for diagnostics; anything beyond is discarded
const STDERR_LIMIT_BYTES: u64 = 64 * 1024;

/// Resource ceilings for one process
#[derive(Debug, Clone)]
pub struct ExecutionLimits {
    /// Wall-clock deadline
    pub timeout: Duration,
    /// RLIMIT_DATA ceiling
    pub memory_bytes: Option<u64>,
    /// RLIMIT_CPU ceiling, a backstop for the wall-clock deadline
    pub cpu_seconds: Option<u64>,
    /// Bytes of stdout captured before the process is killed
    pub output_limit_bytes: u64,
}

impl ExecutionLimits {
    /// Limits for a test case run: deadline plus memory/CPU ceilings
    pub fn for_run(timeout: Duration, memory_mb: u64, output_limit_kb: u64) -> Self {
        Self {
            timeout,
            memory_bytes: Some(memory_mb * 1024 * 1024),
            cpu_seconds: Some(timeout.as_secs() + 1),
            output_limit_bytes: output_limit_kb * 1024,
        }
    }

    /// Limits for a toolchain invocation: only the deadline and output cap
    pub fn for_compile(timeout: Duration, output_limit_kb: u64) -> Self {
        Self {
            timeout,
            memory_bytes: None,
            cpu_seconds: None,
            output_limit_bytes: output_limit_kb * 1024,
        }
    }
}

/// Captured result of a finished (or killed) process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Terminating signal, if any
    pub signal: Option<i32>,
    pub elapsed: Duration,
    pub timed_out: bool,
    pub output_limit_exceeded: bool,
}

impl ProcessOutput {
    /// True when the process exited on its own with status 0
    pub fn success(&self) -> bool {
        !self.timed_out && !self.output_limit_exceeded && self.exit_code == Some(0)
    }

    /// Human readable description of a failed run
    pub fn failure_message(&self) -> String {
        if self.timed_out {
            return format!("Time limit exceeded after {} ms", self.elapsed.as_millis());
        }
        if self.output_limit_exceeded {
            return "Output limit exceeded".to_string();
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.chars().take(500).collect();
        }
        match (self.exit_code, self.signal) {
            (_, Some(signal)) => format!("Killed by signal {}", signal),
            (Some(code), None) => format!("Process exited with code {}", code),
            (None, None) => "Process terminated abnormally".to_string(),
        }
    }
}

/// Run `argv` in `workdir`, feeding `stdin` and enforcing `limits`.
///
/// Only failures to start the process are errors; everything the process
/// does once running is reported through [`ProcessOutput`].
pub async fn execute(
    argv: &[String],
    workdir: &Path,
    stdin: &str,
    limits: &ExecutionLimits,
) -> Result<ProcessOutput, SandboxError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| SandboxError::Launch {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

    let mut command = Command::new(resolve_program(workdir, program));
    command
        .args(args)
        .current_dir(workdir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true);

    let memory_bytes = limits.memory_bytes;
    let cpu_seconds = limits.cpu_seconds;
    // SAFETY: the closure runs in the forked child before exec and only
    // calls setrlimit, which is async-signal-safe.
    unsafe {
        command.pre_exec(move || {
            if let Some(bytes) = memory_bytes {
                setrlimit(Resource::RLIMIT_DATA, bytes, bytes)?;
            }
            if let Some(seconds) = cpu_seconds {
                setrlimit(Resource::RLIMIT_CPU, seconds, seconds)?;
            }
            Ok(())
        });
    }

    let start = Instant::now();
    let mut child = command.spawn().map_err(|source| SandboxError::Launch {
        program: program.clone(),
        source,
    })?;
    let pid = child.id();

    let child_stdin = child.stdin.take();
    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();
    let input = stdin.to_owned();
    let output_limit = limits.output_limit_bytes;

    let run = async {
        let feed = async move {
            if let Some(mut pipe) = child_stdin {
                // The program may exit without reading its input
                let _ = pipe.write_all(input.as_bytes()).await;
                let _ = pipe.shutdown().await;
            }
        };
        let collect_stdout = async {
            let captured = read_capped(child_stdout, output_limit).await;
            if captured.1 {
                kill_group(pid);
            }
            captured
        };
        let collect_stderr = async {
            let mut pipe = child_stderr;
            let captured = read_capped(pipe.as_mut(), STDERR_LIMIT_BYTES).await;
            // A blocked writer would never reach its stdout answer
            if let Some(rest) = pipe.as_mut() {
                let _ = tokio::io::copy(rest, &mut tokio::io::sink()).await;
            }
            captured
        };

        let ((), (stdout, truncated), (stderr, _)) =
            tokio::join!(feed, collect_stdout, collect_stderr);
        let status = child.wait().await;
        (stdout, truncated, stderr, status)
    };

    match timeout(limits.timeout, run).await {
        Ok((stdout, truncated, stderr, status)) => {
            let status = status.map_err(SandboxError::Io)?;
            let (exit_code, signal) = split_status(status);
            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                exit_code,
                signal,
                elapsed: start.elapsed(),
                timed_out: false,
                output_limit_exceeded: truncated,
            })
        }
        Err(_) => {
            kill_group(pid);
            let _ = child.start_kill();
            let _ = child.wait().await;
            tracing::debug!(program = %program, "Process killed after deadline");
            Ok(ProcessOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: None,
                signal: Some(Signal::SIGKILL as i32),
                elapsed: start.elapsed(),
                timed_out: true,
                output_limit_exceeded: false,
            })
        }
    }
}

/// Programs given as `./name` live in the work directory.
fn resolve_program(workdir: &Path, program: &str) -> PathBuf {
    match program.strip_prefix("./") {
        Some(relative) => workdir.join(relative),
        None => PathBuf::from(program),
    }
}

/// Read at most `limit` bytes; the flag reports whether more was available.
async fn read_capped<R>(reader: Option<R>, limit: u64) -> (Vec<u8>, bool)
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return (Vec::new(), false);
    };

    let mut buf = Vec::new();
    if (&mut reader).take(limit + 1).read_to_end(&mut buf).await.is_err() {
        return (buf, false);
    }

    if buf.len() as u64 > limit {
        buf.truncate(limit as usize);
        (buf, true)
    } else {
        (buf, false)
    }
}

fn kill_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        // The group may already be gone
        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
}

fn split_status(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    use std::os::unix::process::ExitStatusExt;
    (status.code(), status.signal())
}
