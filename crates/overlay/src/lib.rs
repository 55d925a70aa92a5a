//! Selection overlay for TinySelect
//!
//! Renders a click-through outline or filled highlight over the screen as
//! live feedback for an interactive region picker.

pub mod color;
pub mod shape;
pub mod window;

pub use color::{ColorCell, Rgba};
pub use shape::{bounding_regions, input_passthrough_region};
pub use window::{OverlayStyle, SelectionRectangle};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("X11 connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("X11 request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("X11 id allocation failed: {0}")]
    Id(#[from] x11rb::errors::ReplyOrIdError),
}

pub type OverlayResult<T> = Result<T, OverlayError>;
