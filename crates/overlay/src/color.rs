//! Server-side color allocation.

use tracing::warn;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::ConnectionExt as _;
use xengine::XEngine;

use crate::OverlayResult;

/// Normalized RGBA color, channels in `[0, 1]`.
///
/// Alpha is not blended into the color; it becomes window-level opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// A color cell allocated from the server colormap.
#[derive(Debug, Clone, Copy)]
pub struct ColorCell {
    pub pixel: u32,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl ColorCell {
    /// Allocate the closest available cell for `color` from the engine's
    /// colormap. A refused allocation (colormap exhaustion) is not fatal:
    /// the screen's white pixel stands in and a warning is emitted.
    pub fn allocate(engine: &XEngine, color: Rgba) -> OverlayResult<Self> {
        let red = channel_to_u16(color.r);
        let green = channel_to_u16(color.g);
        let blue = channel_to_u16(color.b);

        let cookie = engine
            .conn()
            .alloc_color(engine.colormap(), red, green, blue)?;
        match cookie.reply() {
            Ok(reply) => Ok(Self {
                pixel: reply.pixel,
                red: reply.red,
                green: reply.green,
                blue: reply.blue,
            }),
            Err(ReplyError::X11Error(err)) => {
                warn!(
                    "couldn't allocate color of value {},{},{} ({:?}), using fallback pixel",
                    color.r, color.g, color.b, err.error_kind
                );
                Ok(Self {
                    pixel: engine.white_pixel(),
                    red,
                    green,
                    blue,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Return the cell to the colormap.
    pub fn free(&self, engine: &XEngine) -> OverlayResult<()> {
        engine
            .conn()
            .free_colors(engine.colormap(), 0, &[self.pixel])?;
        Ok(())
    }
}

/// Convert a `[0, 1]` channel to the 16-bit range the protocol expects.
pub(crate) fn channel_to_u16(channel: f32) -> u16 {
    (f64::from(channel) * 65535.0).floor() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_conversion_floors() {
        assert_eq!(channel_to_u16(0.0), 0);
        assert_eq!(channel_to_u16(1.0), 65535);
        assert_eq!(channel_to_u16(0.5), 32767);
        assert_eq!(channel_to_u16(0.25), 16383);
    }

    #[test]
    fn opaque_has_full_alpha() {
        let color = Rgba::opaque(0.2, 0.4, 0.6);
        assert_eq!(color.a, 1.0);
    }
}
