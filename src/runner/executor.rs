//! The seam between the run and real processes.

use chrono::Local;
use std::cell::{Cell, RefCell};

use crate::shell::{
    run_process, CapturedOutput, CloseStatus, InvocationResult, Notification, Observer,
    ProcessError, ProcessEvent, ProcessRequest,
};

/// Runs external programs on behalf of the session.
pub trait ProcessExecutor {
    fn execute(
        &self,
        request: &ProcessRequest,
        observer: &mut Observer<'_>,
    ) -> Result<InvocationResult, ProcessError>;
}

/// Spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn execute(
        &self,
        request: &ProcessRequest,
        observer: &mut Observer<'_>,
    ) -> Result<InvocationResult, ProcessError> {
        run_process(request, observer)
    }
}

#[derive(Debug, Clone)]
struct Script {
    fragment: String,
    exit_code: i32,
    stdout: String,
    stderr: String,
    spawn_error: bool,
}

/// Answers commands from a script instead of spawning them.
///
/// The first rule whose fragment occurs in the command line wins; anything
/// unmatched exits 0 with no output. Every command line is recorded.
///
/// ```
/// use orgbuilder::runner::{ProcessExecutor, ScriptedExecutor};
/// use orgbuilder::shell::ProcessRequest;
///
/// let executor = ScriptedExecutor::new().respond("alias:list", 0, r#"{"result":[]}"#);
/// let request = ProcessRequest::from_command_line("sfdx force:alias:list --json", ".").unwrap();
/// let result = executor.execute(&request, &mut |_| {}).unwrap();
/// assert!(result.stdout.contains("result"));
/// assert_eq!(executor.calls(), ["sfdx force:alias:list --json"]);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    scripts: Vec<Script>,
    calls: RefCell<Vec<String>>,
    argv: RefCell<Vec<Vec<String>>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `fragment` exit with `exit_code` after printing
    /// `stdout`.
    pub fn respond(mut self, fragment: &str, exit_code: i32, stdout: &str) -> Self {
        self.scripts.push(Script {
            fragment: fragment.to_string(),
            exit_code,
            stdout: stdout.to_string(),
            stderr: String::new(),
            spawn_error: false,
        });
        self
    }

    /// Commands containing `fragment` print `stderr` and exit 1.
    pub fn fail(mut self, fragment: &str, stderr: &str) -> Self {
        self.scripts.push(Script {
            fragment: fragment.to_string(),
            exit_code: 1,
            stdout: String::new(),
            stderr: stderr.to_string(),
            spawn_error: false,
        });
        self
    }

    /// Commands containing `fragment` cannot be started at all.
    pub fn missing(mut self, fragment: &str) -> Self {
        self.scripts.push(Script {
            fragment: fragment.to_string(),
            exit_code: -1,
            stdout: String::new(),
            stderr: String::new(),
            spawn_error: true,
        });
        self
    }

    /// Command lines executed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Program and arguments of every call, as a process would receive them.
    pub fn argv(&self) -> Vec<Vec<String>> {
        self.argv.borrow().clone()
    }

    fn script_for(&self, line: &str) -> Option<&Script> {
        self.scripts.iter().find(|s| line.contains(&s.fragment))
    }
}

impl ProcessExecutor for ScriptedExecutor {
    fn execute(
        &self,
        request: &ProcessRequest,
        observer: &mut Observer<'_>,
    ) -> Result<InvocationResult, ProcessError> {
        let line = request.command_line();
        self.calls.borrow_mut().push(line.clone());
        self.argv.borrow_mut().push(
            std::iter::once(request.program.clone())
                .chain(request.args.iter().cloned())
                .collect(),
        );
        let script = self.script_for(&line).cloned().unwrap_or(Script {
            fragment: String::new(),
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            spawn_error: false,
        });

        let started_at = Local::now();
        let mut output = CapturedOutput::default();
        let mut history = Vec::new();
        let resolved = Cell::new(false);
        let mut emit = |event: ProcessEvent, output: &mut CapturedOutput| {
            match &event {
                ProcessEvent::Stdout(chunk) => output.stdout.push_str(chunk),
                ProcessEvent::Stderr(chunk) => output.stderr.push_str(chunk),
                ProcessEvent::Error(message) => output.errors.push_str(message),
                ProcessEvent::Close(status) => output.close = Some(*status),
                ProcessEvent::Spawn { .. } => {}
            }
            history.push(event);
            if let Some(event) = history.last() {
                observer(&Notification::new(event, output, &history, &resolved));
            }
        };

        let result = |output: &CapturedOutput, forced: bool| InvocationResult {
            command: line.clone(),
            cwd: request.cwd.clone(),
            exit_code: output.close.and_then(|c| c.code),
            signal: None,
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
            started_at,
            finished_at: Local::now(),
            forced,
        };

        if script.spawn_error {
            let source = std::io::Error::new(std::io::ErrorKind::NotFound, "program not found");
            emit(ProcessEvent::Error(source.to_string()), &mut output);
            return Err(ProcessError::Spawn {
                program: request.program.clone(),
                source,
                result: Box::new(result(&output, false)),
            });
        }

        emit(ProcessEvent::Spawn { pid: 0 }, &mut output);
        if !script.stdout.is_empty() {
            emit(ProcessEvent::Stdout(script.stdout.clone()), &mut output);
            if resolved.get() {
                return Ok(result(&output, true));
            }
        }
        if !script.stderr.is_empty() {
            emit(ProcessEvent::Stderr(script.stderr.clone()), &mut output);
            if resolved.get() {
                return Ok(result(&output, true));
            }
        }
        emit(
            ProcessEvent::Close(CloseStatus {
                code: Some(script.exit_code),
                signal: None,
            }),
            &mut output,
        );

        let result = result(&output, resolved.get());
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
}
