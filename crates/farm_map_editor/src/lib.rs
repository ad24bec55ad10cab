//! Editing front end for farm_map
//!
//! - `EditorSession` - owns the grid being edited, the brush boundary, and
//!   stroke-grouped undo/redo
//! - `EditorConfig` - TOML settings for sessions and the CLI
//! - `export` - render grid layers to PNG files
//!
//! The `farm_map` binary drives these headlessly.

pub mod commands;
pub mod config;
pub mod export;
pub mod session;

pub use commands::{CellChangesCommand, Command, CommandHistory, ReplaceGridCommand};
pub use config::{ConfigError, EditorConfig, RenderConfig, WorldConfig};
pub use export::{render_layers, save_layers};
pub use session::{EditorError, EditorSession};

// Re-export the lower crates for binary and downstream use
pub use farm_map_autotile;
pub use farm_map_core;
pub use farm_map_render;
