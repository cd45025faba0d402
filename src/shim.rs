//! Thin wrappers over the operating system: external tools, file times and
//! duration formatting.

mod clock;
mod command;
mod format;

pub use clock::{CreationTime, PlatformClock, set_file_times};
pub use command::run_tool;
pub use format::format_duration;
