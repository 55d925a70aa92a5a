//! X11 engine context for TinySelect
//!
//! Owns the server connection and the screen facts the overlay needs.

pub mod engine;

pub use engine::XEngine;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to connect to X server: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("X11 connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("X11 request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("SHAPE extension not supported by this server")]
    ShapeUnsupported,
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Rectangle in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Normalize two arbitrary corner points into a rectangle, whichever
    /// corner the drag started from.
    pub fn from_corners(sx: i32, sy: i32, ex: i32, ey: i32) -> Self {
        let x = sx.min(ex);
        let y = sy.min(ey);
        let width = (sx - ex).unsigned_abs();
        let height = (sy - ey).unsigned_abs();

        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_normalize_in_any_order() {
        let expected = Rect::new(10, 20, 30, 40);

        assert_eq!(Rect::from_corners(10, 20, 40, 60), expected);
        assert_eq!(Rect::from_corners(40, 20, 10, 60), expected);
        assert_eq!(Rect::from_corners(10, 60, 40, 20), expected);
        assert_eq!(Rect::from_corners(40, 60, 10, 20), expected);
    }

    #[test]
    fn coincident_corners_give_empty_rect() {
        let rect = Rect::from_corners(5, 7, 5, 7);
        assert_eq!(rect, Rect::new(5, 7, 0, 0));
    }

    #[test]
    fn negative_coordinates_normalize() {
        let rect = Rect::from_corners(-10, -5, 10, 5);
        assert_eq!(rect, Rect::new(-10, -5, 20, 10));
    }

    #[test]
    fn edges_and_containment() {
        let rect = Rect::new(10, 10, 50, 30);
        assert_eq!(rect.right(), 60);
        assert_eq!(rect.bottom(), 40);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(59, 39));
        assert!(!rect.contains(60, 10));
        assert!(!rect.contains(10, 40));
    }
}
