//! Terminal front end for the category browser.
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - keyboard handling
//! - `events` - background reload results
//! - `render` - frame layout
//! - `tree`, `details`, `status` - widgets
//! - `text` - plain-text output for non-interactive use

mod details;
mod events;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;
mod text;
mod tree;

pub use loop_runner::{run, Action};
pub use text::{format_row, write_rows};
