//! Overlay window lifecycle: create, reshape, synchronous teardown.

use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;
use x11rb::connection::Connection;
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    AtomEnum, ChangeWindowAttributesAux, ClipOrdering, ConnectionExt as _, CreateWindowAux,
    EventMask, PropMode, Rectangle, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::wrapper::ConnectionExt as _;
use xengine::{Rect, XEngine};

use crate::color::{ColorCell, Rgba};
use crate::shape::{bounding_regions, input_passthrough_region};
use crate::OverlayResult;

/// WM_CLASS instance and class, so external tools can recognize the overlay.
const WM_CLASS: &[u8] = b"tinyselect\0tinyselect\0";

/// Grace period for the server to repaint around teardown. Heuristic: there
/// is no repaint acknowledgment in the core protocol to wait on instead.
const REPAINT_SETTLE: Duration = Duration::from_millis(10);

/// Poll interval while a bounded destroy wait drains events.
const DESTROY_POLL: Duration = Duration::from_millis(1);

/// Visual style of the overlay, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    /// Outline thickness in pixels. `0` disables the overlay entirely.
    pub border: u32,
    /// Fill the whole selection instead of outlining it. Also forces the
    /// effective border to `0`.
    pub highlight: bool,
    pub color: Rgba,
    /// Upper bound on the wait for the server's destroy confirmation.
    /// `None` blocks until the event arrives.
    pub destroy_wait: Option<Duration>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            border: 1,
            highlight: false,
            color: Rgba::opaque(1.0, 0.0, 0.0),
            destroy_wait: None,
        }
    }
}

/// The live selection indicator: one full-screen, click-through window
/// whose bounding shape is the outline (or highlight fill) of the current
/// selection.
///
/// The window and its color cell are owned exclusively by this value and
/// are released, synchronously, on drop.
pub struct SelectionRectangle<'e> {
    engine: &'e XEngine,
    rect: Rect,
    border: u32,
    highlight: bool,
    window: Option<Window>,
    color: Option<ColorCell>,
    destroy_wait: Option<Duration>,
}

impl<'e> SelectionRectangle<'e> {
    /// Build and map the overlay for the selection spanned by two corner
    /// points, in either order. A zero border yields an inert instance
    /// that never touches the server.
    pub fn new(
        engine: &'e XEngine,
        sx: i32,
        sy: i32,
        ex: i32,
        ey: i32,
        style: &OverlayStyle,
    ) -> OverlayResult<Self> {
        let rect = Rect::from_corners(sx, sy, ex, ey);

        if style.border == 0 {
            return Ok(Self {
                engine,
                rect,
                border: 0,
                highlight: style.highlight,
                window: None,
                color: None,
                destroy_wait: style.destroy_wait,
            });
        }

        // Highlight fills the selection itself, so the stored outline
        // thickness collapses to zero.
        let border = if style.highlight { 0 } else { style.border };

        let color = ColorCell::allocate(engine, style.color)?;

        let conn = engine.conn();
        let window = conn.generate_id()?;
        // The window covers the whole screen and never moves; the shape
        // mask alone decides what is visible. Reshaping per pointer frame
        // is much cheaper than moving and resizing the window itself.
        let values = CreateWindowAux::new()
            .background_pixel(color.pixel)
            .override_redirect(1)
            .event_mask(EventMask::STRUCTURE_NOTIFY);
        conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            window,
            engine.root(),
            0,
            0,
            engine.width(),
            engine.height(),
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &values,
        )?;

        if let Some(opacity) = opacity_value(style.color.a) {
            conn.change_property32(
                PropMode::REPLACE,
                window,
                engine.opacity_atom(),
                AtomEnum::CARDINAL,
                &[opacity],
            )?;
        }

        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_CLASS,
            AtomEnum::STRING,
            WM_CLASS,
        )?;

        let overlay = Self {
            engine,
            rect,
            border,
            highlight: style.highlight,
            window: Some(window),
            color: Some(color),
            destroy_wait: style.destroy_wait,
        };
        overlay.apply_bounding_shape()?;
        overlay.apply_input_shape()?;

        conn.map_window(window)?;
        conn.flush()?;

        Ok(overlay)
    }

    /// Current selection rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// True when a zero border disabled the overlay at construction.
    pub fn is_inert(&self) -> bool {
        self.window.is_none()
    }

    /// Move the selection to the rectangle spanned by two new corner
    /// points. Only the bounding shape is re-applied; the window stays
    /// full-screen. Calling with unchanged points re-applies an identical
    /// mask and nothing else.
    pub fn set_geometry(&mut self, sx: i32, sy: i32, ex: i32, ey: i32) -> OverlayResult<()> {
        self.rect = Rect::from_corners(sx, sy, ex, ey);
        if self.window.is_some() {
            self.apply_bounding_shape()?;
            self.engine.conn().flush()?;
        }
        Ok(())
    }

    fn apply_bounding_shape(&self) -> OverlayResult<()> {
        let Some(window) = self.window else {
            return Ok(());
        };
        let rects: Vec<Rectangle> = bounding_regions(&self.rect, self.border, self.highlight)
            .iter()
            .map(to_x11_rect)
            .collect();
        self.engine.conn().shape_rectangles(
            shape::SO::SET,
            shape::SK::BOUNDING,
            ClipOrdering::UNSORTED,
            window,
            0,
            0,
            &rects,
        )?;
        Ok(())
    }

    fn apply_input_shape(&self) -> OverlayResult<()> {
        let Some(window) = self.window else {
            return Ok(());
        };
        self.engine.conn().shape_rectangles(
            shape::SO::SET,
            shape::SK::INPUT,
            ClipOrdering::UNSORTED,
            window,
            0,
            0,
            &[to_x11_rect(&input_passthrough_region())],
        )?;
        Ok(())
    }

    /// Synchronous teardown: erase, release the color cell, destroy, then
    /// wait for the server's confirmation so no artifact outlives the
    /// overlay. The order is fixed; reordering reintroduces the visible
    /// flash the erase-first step exists to avoid.
    fn teardown(&mut self) -> OverlayResult<()> {
        let Some(window) = self.window.take() else {
            return Ok(());
        };
        let engine = self.engine;
        let conn = engine.conn();

        // Erase before destroying, otherwise the outline can linger as a
        // ghost until the next repaint.
        conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().background_pixel(0),
        )?;
        conn.clear_area(false, window, 0, 0, 0, 0)?;
        conn.flush()?;
        thread::sleep(REPAINT_SETTLE);

        if let Some(color) = self.color.take() {
            color.free(engine)?;
        }

        conn.destroy_window(window)?;
        conn.flush()?;
        self.wait_for_destroy(window)?;
        thread::sleep(REPAINT_SETTLE);

        Ok(())
    }

    /// Consume events until the `DestroyNotify` for `window` arrives;
    /// notifications for any other window are discarded. Unbounded by
    /// default, a deadline poll when `destroy_wait` is set.
    fn wait_for_destroy(&self, window: Window) -> OverlayResult<()> {
        let conn = self.engine.conn();
        match self.destroy_wait {
            None => loop {
                if let Event::DestroyNotify(ev) = conn.wait_for_event()? {
                    if ev.window == window {
                        return Ok(());
                    }
                }
            },
            Some(bound) => {
                let deadline = Instant::now() + bound;
                loop {
                    while let Some(event) = conn.poll_for_event()? {
                        if let Event::DestroyNotify(ev) = event {
                            if ev.window == window {
                                return Ok(());
                            }
                        }
                    }
                    if Instant::now() >= deadline {
                        warn!(
                            "no destroy confirmation for window {} within {:?}",
                            window, bound
                        );
                        return Ok(());
                    }
                    thread::sleep(DESTROY_POLL);
                }
            }
        }
    }
}

impl Drop for SelectionRectangle<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            warn!("overlay teardown failed: {err}");
        }
    }
}

/// `_NET_WM_WINDOW_OPACITY` value for `alpha`, or `None` when the window
/// is fully opaque and the property must not be set at all.
fn opacity_value(alpha: f32) -> Option<u32> {
    if alpha < 1.0 {
        Some((f64::from(alpha) * f64::from(u32::MAX)).floor() as u32)
    } else {
        None
    }
}

fn to_x11_rect(rect: &Rect) -> Rectangle {
    Rectangle {
        x: rect.x as i16,
        y: rect.y as i16,
        width: rect.width as u16,
        height: rect.height as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_alpha_floors_to_cardinal() {
        assert_eq!(opacity_value(0.5), Some(2_147_483_647));
    }

    #[test]
    fn full_alpha_sets_no_property() {
        assert_eq!(opacity_value(1.0), None);
    }

    #[test]
    fn zero_alpha_is_fully_transparent() {
        assert_eq!(opacity_value(0.0), Some(0));
    }

    #[test]
    fn x11_rect_conversion() {
        let rect = Rect::new(-4, 6, 54, 4);
        let converted = to_x11_rect(&rect);
        assert_eq!(converted.x, -4);
        assert_eq!(converted.y, 6);
        assert_eq!(converted.width, 54);
        assert_eq!(converted.height, 4);
    }

    #[test]
    fn default_style_is_thin_opaque_outline() {
        let style = OverlayStyle::default();
        assert_eq!(style.border, 1);
        assert!(!style.highlight);
        assert_eq!(style.color.a, 1.0);
        assert!(style.destroy_wait.is_none());
    }
}
