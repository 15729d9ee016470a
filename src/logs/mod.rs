//! Run logs: one JSON artifact per command plus the run summaries.

pub mod artifact;
pub mod writer;

pub use artifact::{artifact_name, item_suffix, structured_output, CommandArtifact};
pub use writer::{is_nested_folder, log_folder, ArtifactWriter, FsWriter, MemoryWriter};

/// Summary of every command line issued.
pub const COMMANDS_FILE: &str = "commands.txt";

/// Summary of every recorded failure.
pub const ERRORS_FILE: &str = "errors.txt";
