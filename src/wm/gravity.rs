//! Gravity Module
//!
//! ICCCM window gravity and on-screen clamping. Pure functions over a
//! [`Client`]; nothing here talks to the server.
//!
//! Before [`apply_gravity`] in APPLY mode the client position is the
//! reference point the application asked for (where its window would sit
//! without a frame). Afterwards it is where the application window's content
//! lands inside the frame. REMOVE is the exact inverse.

use crate::config::DecorationConfig;
use crate::shared::{FrameExtents, Geometry};
use crate::wm::client::Client;

/// The nine anchor points plus static
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
    Static,
}

impl Gravity {
    /// From the ICCCM numeric value; unknown and ForgetGravity act as NorthWest
    pub fn from_u32(value: u32) -> Self {
        match value {
            2 => Gravity::North,
            3 => Gravity::NorthEast,
            4 => Gravity::West,
            5 => Gravity::Center,
            6 => Gravity::East,
            7 => Gravity::SouthWest,
            8 => Gravity::South,
            9 => Gravity::SouthEast,
            10 => Gravity::Static,
            _ => Gravity::NorthWest,
        }
    }

    pub fn of(client: &Client) -> Self {
        client
            .size_hints
            .gravity()
            .map(Gravity::from_u32)
            .unwrap_or_default()
    }

    /// How far the content moves when the frame is added
    pub fn offsets(self, ext: FrameExtents) -> (i32, i32) {
        let (l, r, t, b) = (
            ext.left as i32,
            ext.right as i32,
            ext.top as i32,
            ext.bottom as i32,
        );

        let dx = match self {
            Gravity::NorthWest | Gravity::West | Gravity::SouthWest => l,
            Gravity::North | Gravity::Center | Gravity::South => (l - r) / 2,
            Gravity::NorthEast | Gravity::East | Gravity::SouthEast => -r,
            Gravity::Static => 0,
        };
        let dy = match self {
            Gravity::NorthWest | Gravity::North | Gravity::NorthEast => t,
            Gravity::West | Gravity::Center | Gravity::East => (t - b) / 2,
            Gravity::SouthWest | Gravity::South | Gravity::SouthEast => -b,
            Gravity::Static => 0,
        };
        (dx, dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityMode {
    Apply,
    Remove,
}

impl GravityMode {
    fn sign(self) -> i32 {
        match self {
            GravityMode::Apply => 1,
            GravityMode::Remove => -1,
        }
    }
}

pub fn apply_gravity(client: &mut Client, mode: GravityMode, cfg: &DecorationConfig) {
    let (dx, dy) = Gravity::of(client).offsets(client.extents(cfg));
    client.x += mode.sign() * dx;
    client.y += mode.sign() * dy;
}

/// Keep the window within its size hints and the frame reachable on `area`
///
/// Expects the reference position, before gravity is applied. The decorative
/// floor is applied last and always wins. Clamping is done on the frame as it
/// will land once gravity is applied, so the title bar stays on screen for
/// every anchor.
pub fn fix_position(client: &mut Client, area: Geometry, cfg: &DecorationConfig) {
    let ext = client.extents(cfg);

    if let Some((min_w, min_h)) = client.size_hints.min_size() {
        client.width = client.width.max(min_w);
        client.height = client.height.max(min_h);
    }
    if let Some((max_w, max_h)) = client.size_hints.max_size() {
        if max_w > 0 {
            client.width = client.width.min(max_w);
        }
        if max_h > 0 {
            client.height = client.height.min(max_h);
        }
    }

    client.width = client.width.min(area.width.saturating_sub(ext.horizontal()));
    client.height = client.height.min(area.height.saturating_sub(ext.vertical()));

    client.width = client.width.max(cfg.min_width as u32);
    client.height = client.height.max(cfg.min_height as u32);

    // Frame origin after APPLY is reference + offset - extent
    let (dx, dy) = Gravity::of(client).offsets(ext);
    let shift_x = dx - ext.left as i32;
    let shift_y = dy - ext.top as i32;

    let frame_w = (client.width + ext.horizontal()) as i32;
    let frame_h = (client.height + ext.vertical()) as i32;
    client.x = clamp_axis(client.x + shift_x, area.x, area.right(), frame_w) - shift_x;
    client.y = clamp_axis(client.y + shift_y, area.y, area.bottom(), frame_h) - shift_y;
}

/// Pull `[pos, pos + extent)` inside `[start, end)`; too big means flush with `start`
fn clamp_axis(pos: i32, start: i32, end: i32, extent: i32) -> i32 {
    if start + extent >= end {
        start
    } else {
        pos.clamp(start, end - extent)
    }
}
