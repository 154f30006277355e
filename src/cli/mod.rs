pub mod commands;
pub mod ui;

mod context;

pub use context::{CommandContext, GlobalArgs};
