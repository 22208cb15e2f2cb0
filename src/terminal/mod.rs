//! A crossterm host for running a list inside a terminal.

pub mod buffer;
pub mod color;
pub mod host;
pub mod scrollbar;

pub use buffer::TerminalBuffer;
pub use color::{ColorLevel, Palette};
pub use host::{Region, TerminalHost, TerminalNode};
pub use scrollbar::TerminalScrollbar;
