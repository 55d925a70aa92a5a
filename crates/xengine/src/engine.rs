//! X server connection and screen context.

use tracing::info;
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{Atom, Colormap, ConnectionExt as _, Window};
use x11rb::rust_connection::RustConnection;

use crate::{EngineError, EngineResult};

/// Shared X11 context: one connection plus the screen handles the overlay
/// draws against. Passed by reference to everything that talks to the
/// server; there is no ambient global.
pub struct XEngine {
    conn: RustConnection,
    root: Window,
    colormap: Colormap,
    white_pixel: u32,
    width: u16,
    height: u16,
    opacity_atom: Atom,
}

impl XEngine {
    /// Connect to the X server named by `display` (`None` reads `$DISPLAY`).
    ///
    /// The overlay is drawn entirely through shape masks, so a server
    /// without the SHAPE extension is rejected here rather than failing on
    /// the first reshape.
    pub fn connect(display: Option<&str>) -> EngineResult<Self> {
        let (conn, screen_num) = x11rb::connect(display)?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let colormap = screen.default_colormap;
        let white_pixel = screen.white_pixel;
        let width = screen.width_in_pixels;
        let height = screen.height_in_pixels;

        conn.extension_information(shape::X11_EXTENSION_NAME)?
            .ok_or(EngineError::ShapeUnsupported)?;
        let shape_version = conn.shape_query_version()?.reply()?;

        let opacity_atom = conn
            .intern_atom(false, b"_NET_WM_WINDOW_OPACITY")?
            .reply()?
            .atom;

        info!(
            "connected to X screen {} ({}x{}), SHAPE {}.{}",
            screen_num,
            width,
            height,
            shape_version.major_version,
            shape_version.minor_version
        );

        Ok(Self {
            conn,
            root,
            colormap,
            white_pixel,
            width,
            height,
            opacity_atom,
        })
    }

    pub fn conn(&self) -> &RustConnection {
        &self.conn
    }

    pub fn root(&self) -> Window {
        self.root
    }

    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    /// Fallback pixel used when a color allocation is refused.
    pub fn white_pixel(&self) -> u32 {
        self.white_pixel
    }

    /// Screen width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Screen height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Interned `_NET_WM_WINDOW_OPACITY` atom.
    pub fn opacity_atom(&self) -> Atom {
        self.opacity_atom
    }

    pub fn flush(&self) -> EngineResult<()> {
        self.conn.flush()?;
        Ok(())
    }
}
