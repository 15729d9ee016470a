//! External process execution.
//!
//! [`run_process`] spawns one program, drains both of its output streams on
//! reader threads and reports every lifecycle event to an observer as it
//! happens. The observer sees the event, the output accumulated so far and
//! the full event history, and may call [`Notification::force_resolve`] to
//! stop waiting for a process that keeps running after its work is done.

use std::cell::Cell;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use super::platform::{join_command, split_command};
use crate::error::Result;

const CHUNK_SIZE: usize = 8 * 1024;

/// What to run.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Program to execute (looked up on `PATH`).
    pub program: String,

    /// Arguments passed verbatim.
    pub args: Vec<String>,

    /// Working directory of the child.
    pub cwd: PathBuf,

    /// Exit code that counts as success.
    pub expected_code: i32,

    /// Pause after the process closes before resolving.
    pub cooldown: Option<Duration>,

    /// The line this request was split from, if any.
    pub line: Option<String>,
}

impl ProcessRequest {
    /// Build a request from a command line such as `sfdx force:org:open -p /home`.
    pub fn from_command_line(line: &str, cwd: impl Into<PathBuf>) -> Result<Self> {
        let (program, args) = split_command(line)?;
        Ok(Self {
            program,
            args,
            cwd: cwd.into(),
            expected_code: 0,
            cooldown: None,
            line: Some(line.trim().to_string()),
        })
    }

    /// The command line as written, or program and arguments quoted for
    /// copy and paste.
    pub fn command_line(&self) -> String {
        match &self.line {
            Some(line) => line.clone(),
            None => join_command(&self.program, &self.args),
        }
    }
}

/// Exit information reported when the process closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CloseStatus {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,

    /// Terminating signal on Unix.
    pub signal: Option<i32>,
}

impl From<ExitStatus> for CloseStatus {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

/// A lifecycle event of one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// The child started.
    Spawn { pid: u32 },
    /// A chunk of standard output.
    Stdout(String),
    /// A chunk of standard error.
    Stderr(String),
    /// The child could not be started or waited on.
    Error(String),
    /// The child exited and both streams are drained.
    Close(CloseStatus),
}

impl ProcessEvent {
    /// Short category name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn",
            Self::Stdout(_) => "stdout",
            Self::Stderr(_) => "stderr",
            Self::Error(_) => "error",
            Self::Close(_) => "close",
        }
    }
}

/// Output accumulated per event category.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub errors: String,
    pub close: Option<CloseStatus>,
}

/// What the observer receives for every event.
pub struct Notification<'a> {
    /// The event that just happened.
    pub event: &'a ProcessEvent,

    /// Everything captured so far, including this event.
    pub output: &'a CapturedOutput,

    /// Every event so far, in arrival order, including this one.
    pub history: &'a [ProcessEvent],

    resolved: &'a Cell<bool>,
}

impl<'a> Notification<'a> {
    /// Notification for an executor other than [`run_process`].
    pub fn new(
        event: &'a ProcessEvent,
        output: &'a CapturedOutput,
        history: &'a [ProcessEvent],
        resolved: &'a Cell<bool>,
    ) -> Self {
        Self {
            event,
            output,
            history,
            resolved,
        }
    }

    /// Resolve the invocation now with what has been captured.
    ///
    /// The child is left running and reaped in the background once it
    /// exits; its streams are no longer read.
    pub fn force_resolve(&self) {
        self.resolved.set(true);
    }
}

/// Observer callback invoked once per event.
pub type Observer<'a> = dyn FnMut(&Notification<'_>) + 'a;

/// Outcome record of one external command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub command: String,
    pub cwd: PathBuf,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,

    /// Resolved by the observer before the process closed.
    pub forced: bool,
}

impl InvocationResult {
    /// Whether the invocation counts as a success for the given expected code.
    pub fn is_success(&self, expected_code: i32) -> bool {
        self.forced || self.exit_code == Some(expected_code)
    }
}

/// Why an invocation was rejected. Always carries the captured output.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
        result: Box<InvocationResult>,
    },

    #[error("'{program}' exited with {code:?}, expected {expected}")]
    UnexpectedExit {
        program: String,
        code: Option<i32>,
        expected: i32,
        result: Box<InvocationResult>,
    },
}

impl ProcessError {
    /// The output captured before the failure.
    pub fn result(&self) -> &InvocationResult {
        match self {
            Self::Spawn { result, .. } | Self::UnexpectedExit { result, .. } => result,
        }
    }
}

struct EventLog<'o, 'a> {
    output: CapturedOutput,
    history: Vec<ProcessEvent>,
    resolved: Cell<bool>,
    observer: &'o mut Observer<'a>,
}

impl<'o, 'a> EventLog<'o, 'a> {
    fn new(observer: &'o mut Observer<'a>) -> Self {
        Self {
            output: CapturedOutput::default(),
            history: Vec::new(),
            resolved: Cell::new(false),
            observer,
        }
    }

    fn record(&mut self, event: ProcessEvent) {
        match &event {
            ProcessEvent::Stdout(chunk) => self.output.stdout.push_str(chunk),
            ProcessEvent::Stderr(chunk) => self.output.stderr.push_str(chunk),
            ProcessEvent::Error(message) => self.output.errors.push_str(message),
            ProcessEvent::Close(status) => {
                // Only the first close counts.
                if self.output.close.is_none() {
                    self.output.close = Some(*status);
                }
            }
            ProcessEvent::Spawn { .. } => {}
        }
        trace!(event = event.kind(), "{:?}", event);
        self.history.push(event);

        if let Some(event) = self.history.last() {
            let notification = Notification {
                event,
                output: &self.output,
                history: &self.history,
                resolved: &self.resolved,
            };
            (self.observer)(&notification);
        }
    }

    fn is_resolved(&self) -> bool {
        self.resolved.get()
    }

    fn finish(self, request: &ProcessRequest, started_at: DateTime<Local>) -> InvocationResult {
        let forced = self.resolved.get();
        let close = self.output.close.unwrap_or(CloseStatus {
            code: None,
            signal: None,
        });
        InvocationResult {
            command: request.command_line(),
            cwd: request.cwd.clone(),
            exit_code: close.code,
            signal: close.signal,
            stdout: self.output.stdout,
            stderr: self.output.stderr,
            started_at,
            finished_at: Local::now(),
            forced,
        }
    }
}

/// Run one external program to completion.
///
/// Resolves with the captured output when the exit code equals
/// `request.expected_code` (or the observer forced resolution), and rejects
/// with the same record otherwise.
pub fn run_process(
    request: &ProcessRequest,
    observer: &mut Observer<'_>,
) -> std::result::Result<InvocationResult, ProcessError> {
    let started_at = Local::now();
    let mut log = EventLog::new(observer);

    debug!(
        program = %request.program,
        cwd = %request.cwd.display(),
        "Executing {}",
        request.command_line()
    );

    let spawned = Command::new(&request.program)
        .args(&request.args)
        .current_dir(&request.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(source) => {
            log.record(ProcessEvent::Error(source.to_string()));
            let result = log.finish(request, started_at);
            return Err(ProcessError::Spawn {
                program: request.program.clone(),
                source,
                result: Box::new(result),
            });
        }
    };

    log.record(ProcessEvent::Spawn { pid: child.id() });

    let (tx, rx) = mpsc::channel();
    if let Some(stdout) = child.stdout.take() {
        let tx = tx.clone();
        thread::spawn(move || pump(stdout, tx, ProcessEvent::Stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        let tx = tx.clone();
        thread::spawn(move || pump(stderr, tx, ProcessEvent::Stderr));
    }
    drop(tx);

    // Ends once both readers hit EOF, so no trailing output is lost.
    for event in rx.iter() {
        log.record(event);
        if log.is_resolved() {
            debug!(program = %request.program, "Resolved before close; leaving process running");
            // Reap the child whenever it exits so it does not linger as a zombie.
            thread::spawn(move || {
                let _ = child.wait();
            });
            return Ok(log.finish(request, started_at));
        }
    }

    let status = match child.wait() {
        Ok(status) => CloseStatus::from(status),
        Err(source) => {
            log.record(ProcessEvent::Error(source.to_string()));
            let result = log.finish(request, started_at);
            return Err(ProcessError::Spawn {
                program: request.program.clone(),
                source,
                result: Box::new(result),
            });
        }
    };
    log.record(ProcessEvent::Close(status));

    if let Some(cooldown) = request.cooldown.filter(|d| !d.is_zero()) {
        debug!("Cooling down for {:?} after process close", cooldown);
        thread::sleep(cooldown);
    }

    let result = log.finish(request, started_at);
    if result.is_success(request.expected_code) {
        Ok(result)
    } else {
        Err(ProcessError::UnexpectedExit {
            program: request.program.clone(),
            code: result.exit_code,
            expected: request.expected_code,
            result: Box::new(result),
        })
    }
}

/// Forward a stream to the event channel in chunks until EOF.
fn pump<R: Read>(
    mut reader: R,
    tx: mpsc::Sender<ProcessEvent>,
    wrap: fn(String) -> ProcessEvent,
) {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut pending: Vec<u8> = Vec::new();
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                pending.extend_from_slice(&buf[..n]);
                let text = take_utf8(&mut pending);
                if !text.is_empty() && tx.send(wrap(text)).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    if !pending.is_empty() {
        let _ = tx.send(wrap(String::from_utf8_lossy(&pending).into_owned()));
    }
}

/// Take the decodable prefix of `pending`, keeping an incomplete trailing
/// UTF-8 sequence for the next read. Invalid bytes become U+FFFD.
fn take_utf8(pending: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut start = 0;
    loop {
        match std::str::from_utf8(&pending[start..]) {
            Ok(valid) => {
                text.push_str(valid);
                pending.clear();
                return text;
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&pending[start..valid_end]));
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + len;
                    }
                    None => {
                        pending.drain(..valid_end);
                        return text;
                    }
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ProcessRequest {
        ProcessRequest {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: std::env::temp_dir(),
            expected_code: 0,
            cooldown: None,
            line: None,
        }
    }

    #[test]
    fn successful_process_resolves_with_output() {
        let result = run_process(&sh("echo hello; echo oops >&2"), &mut |_| {}).unwrap();
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "oops\n");
        assert!(!result.forced);
        assert!(result.finished_at >= result.started_at);
    }

    #[test]
    fn unexpected_exit_rejects_with_captured_output() {
        let err = run_process(&sh("echo partial; exit 3"), &mut |_| {}).unwrap_err();
        assert!(matches!(err, ProcessError::UnexpectedExit { code: Some(3), .. }));
        assert_eq!(err.result().stdout, "partial\n");
        assert_eq!(err.result().exit_code, Some(3));
    }

    #[test]
    fn expected_code_can_be_non_zero() {
        let mut request = sh("exit 2");
        request.expected_code = 2;
        assert!(run_process(&request, &mut |_| {}).is_ok());
    }

    #[test]
    fn missing_program_rejects_with_error_event() {
        let request = ProcessRequest {
            program: "definitely-not-a-real-program-xyz".to_string(),
            args: vec![],
            cwd: std::env::temp_dir(),
            expected_code: 0,
            cooldown: None,
            line: None,
        };
        let mut kinds = Vec::new();
        let err = run_process(&request, &mut |n| kinds.push(n.event.kind())).unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
        assert_eq!(kinds, vec!["error"]);
    }

    #[test]
    fn observer_sees_lifecycle_in_order() {
        let mut kinds = Vec::new();
        run_process(&sh("echo one"), &mut |n| kinds.push(n.event.kind())).unwrap();
        assert_eq!(kinds.first(), Some(&"spawn"));
        assert_eq!(kinds.last(), Some(&"close"));
        assert!(kinds.contains(&"stdout"));
    }

    #[test]
    fn observer_sees_accumulated_output_and_history() {
        let mut last_len = 0;
        let mut history_len = 0;
        run_process(&sh("printf 'a'; sleep 0.05; printf 'b'"), &mut |n| {
            last_len = n.output.stdout.len();
            history_len = n.history.len();
        })
        .unwrap();
        assert_eq!(last_len, 2);
        assert!(history_len >= 3);
    }

    #[test]
    fn trailing_output_of_fast_process_is_drained() {
        let result = run_process(&sh("seq 1 2000"), &mut |_| {}).unwrap();
        assert!(result.stdout.ends_with("2000\n"));
    }

    #[test]
    fn force_resolve_returns_before_close() {
        let request = sh("echo READY; sleep 30");
        let result = run_process(&request, &mut |n| {
            if n.output.stdout.contains("READY") {
                n.force_resolve();
            }
        })
        .unwrap();
        assert!(result.forced);
        assert_eq!(result.exit_code, None);
        assert!(result.stdout.contains("READY"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn force_resolved_child_is_reaped_after_exit() {
        let mut pid = 0;
        run_process(&sh("echo READY; sleep 0.2"), &mut |n| {
            if let ProcessEvent::Spawn { pid: spawned } = n.event {
                pid = *spawned;
            }
            if n.output.stdout.contains("READY") {
                n.force_resolve();
            }
        })
        .unwrap();

        let proc_entry = std::path::PathBuf::from(format!("/proc/{}", pid));
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while proc_entry.exists() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(50));
        }
        assert!(!proc_entry.exists(), "child {} was not reaped", pid);
    }

    #[test]
    fn command_line_is_kept_as_written() {
        let line = r#"sfdx force:community:publish --name "My Site""#;
        let request = ProcessRequest::from_command_line(line, "/tmp").unwrap();
        assert_eq!(request.program, "sfdx");
        assert_eq!(request.args, ["force:community:publish", "--name", "My Site"]);
        assert_eq!(request.command_line(), line);
    }

    #[test]
    fn command_line_is_quoted_without_a_source_line() {
        let request = sh("echo a b");
        assert_eq!(request.command_line(), "sh -c 'echo a b'");
    }

    #[test]
    fn take_utf8_keeps_incomplete_sequence() {
        let mut pending = "é".as_bytes()[..1].to_vec();
        pending.splice(0..0, b"ab".iter().copied());
        assert_eq!(take_utf8(&mut pending), "ab");
        assert_eq!(pending.len(), 1);
        pending.push("é".as_bytes()[1]);
        assert_eq!(take_utf8(&mut pending), "é");
        assert!(pending.is_empty());
    }

    #[test]
    fn take_utf8_replaces_invalid_bytes_and_keeps_the_tail() {
        let mut pending = b"a\xffb".to_vec();
        pending.extend_from_slice(&"é".as_bytes()[..1]);
        assert_eq!(take_utf8(&mut pending), "a\u{FFFD}b");
        assert_eq!(pending, &"é".as_bytes()[..1]);
        pending.push("é".as_bytes()[1]);
        assert_eq!(take_utf8(&mut pending), "é");
    }
}
