use x11rb::protocol::xproto::{Colormap, Window};

use crate::config::DecorationConfig;
use crate::shared::{FrameExtents, Geometry};
use crate::wm::hints::{Decorations, SizeHints};

/// ICCCM managed state, as stored in `WM_STATE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum WmState {
    Withdrawn = 0,
    Normal = 1,
    Iconic = 3,
}

impl WmState {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(WmState::Withdrawn),
            1 => Some(WmState::Normal),
            3 => Some(WmState::Iconic),
            _ => None,
        }
    }
}

/// Window Manager client state
/// Represents a window being managed by the WM
///
/// `x`, `y` are the root position of the application window's content;
/// the frame sits around it according to [`Client::extents`].
#[derive(Debug, Clone)]
pub struct Client {
    /// Application window (owned by the application)
    pub window: Window,

    /// Decoration frame, created once during adoption
    pub frame: Option<Window>,

    pub title: String,

    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,

    pub colormap: Colormap,

    /// WM_HINTS input field; false means never SetInputFocus on it
    pub accepts_input: bool,

    pub size_hints: SizeHints,

    pub decorations: Decorations,

    /// Window this one is a dialog for; looked up in the registry on demand
    pub transient_for: Option<Window>,

    /// Iconified
    pub hidden: bool,
    pub was_hidden: bool,

    /// Unmap notifications we provoked ourselves and must not treat as
    /// withdrawals. Bump before the request, never after.
    pub ignore_unmap: u32,

    pub has_been_shaped: bool,

    pub wm_state: WmState,

    /// Border width the application asked for, restored on release
    pub original_border_width: u32,
}

impl Client {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            frame: None,
            title: String::new(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            colormap: x11rb::NONE,
            accepts_input: true,
            size_hints: SizeHints::default(),
            decorations: Decorations::default(),
            transient_for: None,
            hidden: false,
            was_hidden: false,
            ignore_unmap: 0,
            has_been_shaped: false,
            wm_state: WmState::Normal,
            original_border_width: 0,
        }
    }

    pub fn has_title(&self) -> bool {
        self.decorations.contains(Decorations::TITLE)
    }

    pub fn has_border(&self) -> bool {
        self.decorations.contains(Decorations::BORDER)
    }

    pub fn title_height(&self, cfg: &DecorationConfig) -> u32 {
        if self.has_title() {
            cfg.titlebar_height as u32
        } else {
            0
        }
    }

    pub fn border_width(&self, cfg: &DecorationConfig) -> u32 {
        if self.has_border() {
            cfg.border_width as u32
        } else {
            0
        }
    }

    /// Per-edge space the frame adds around the application window
    pub fn extents(&self, cfg: &DecorationConfig) -> FrameExtents {
        let bw = self.border_width(cfg);
        FrameExtents {
            left: bw,
            right: bw,
            top: self.title_height(cfg) + bw,
            bottom: bw,
        }
    }

    /// Application window geometry in root coordinates
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.x, self.y, self.width, self.height)
    }

    /// Outer frame geometry, border included
    pub fn frame_geometry(&self, cfg: &DecorationConfig) -> Geometry {
        let ext = self.extents(cfg);
        Geometry {
            x: self.x - ext.left as i32,
            y: self.y - ext.top as i32,
            width: self.width + ext.horizontal(),
            height: self.height + ext.vertical(),
        }
    }

    /// Record that the next unmap notification for this window is ours
    pub fn expect_unmap(&mut self) {
        self.ignore_unmap += 1;
    }

    /// Returns true if an unmap notification was expected and has now been
    /// accounted for; false means the unmap is real.
    pub fn consume_expected_unmap(&mut self) -> bool {
        if self.ignore_unmap > 0 {
            self.ignore_unmap -= 1;
            true
        } else {
            false
        }
    }
}
