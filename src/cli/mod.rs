//! CLI command implementations.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `render` | Reconcile one snapshot file and print the renderable graph |
//! | `watch`  | Poll a snapshot file on an interval and print each pass |

mod render;
mod watch;

pub use render::{cmd_render, OutputFormat, RenderArgs};
pub use watch::{cmd_watch, WatchArgs};
