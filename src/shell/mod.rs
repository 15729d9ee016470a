//! External process execution and environment detection.

pub mod command;
pub mod platform;

pub use command::{
    run_process, CapturedOutput, CloseStatus, InvocationResult, Notification, Observer,
    ProcessError, ProcessEvent, ProcessRequest,
};
pub use platform::{is_unattended, join_command, split_command, UNATTENDED_VAR};
