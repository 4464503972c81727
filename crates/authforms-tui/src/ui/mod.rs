//! Terminal UI module using ratatui.
//!
//! - `render`: page layout, form dialog and status region
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
