//! RSS-Studio: Reed-Solomon Studio front-end
//!
//! Interactive and one-shot command-line front-end over the `rss-codec`
//! session controller.
//!
//! ```text
//! rss> encode Hello, world
//! Encoded
//!   origin:      remote
//!   original:    12 bytes
//!   encoded:     22 bytes
//!   ...
//! rss> set rate 20%
//! rss> simulate
//! ```

pub mod domain;
pub mod ui;

pub use domain::{App, AppState, Command, CommandError, Controls, Setting, ThemeChoice};
pub use ui::{OutputMode, Renderer};
