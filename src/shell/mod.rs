//! Process execution and host platform queries.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{
    progress_segments, ChildProcess, ChildState, CommandResult, CommandSpec, OutputLine,
    ProcessRunner, SystemRunner,
};
pub use mock::{MockChild, MockResponse, MockRunner};
pub use platform::{
    find_in_path, host_machine, installer_suffix, is_elevated, prepend_to_path, same_file,
};
