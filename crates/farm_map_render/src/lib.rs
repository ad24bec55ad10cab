//! Incremental rendering for farm_map grids
//!
//! Each of the four layers draws onto its own `DrawSurface`. Between frames
//! only cells whose content changed are cleared and redrawn; large edits fall
//! back to a full redraw of every layer.
//!
//! Sprite sheets load lazily through `SheetCache`. A cell whose sheet is not
//! ready yet is skipped and retried on a later frame.

pub mod diff;
pub mod draw;
pub mod renderer;
pub mod sheets;
pub mod surface;

pub use diff::diff_grids;
pub use draw::{cell_pixel_rect, draw_layer, update_cells, DrawStats};
pub use renderer::{IncrementalRenderer, RenderPass, DEFAULT_FULL_REDRAW_THRESHOLD};
pub use sheets::{FileSheetSource, MemorySheetSource, SheetCache, SheetError, SheetSource};
pub use surface::{DrawSurface, ImageSurface, PixelRect};
