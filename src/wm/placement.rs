//! Placement Module
//!
//! Initial position for windows that did not say where they want to be.

use tracing::{debug, warn};

use crate::config::DecorationConfig;
use crate::wm::client::Client;
use crate::wm::display::DisplayServer;
use crate::wm::gravity::{apply_gravity, GravityMode};

/// Size floor, then pointer placement if the window gave no position
pub fn init_position<D: DisplayServer + ?Sized>(
    display: &D,
    client: &mut Client,
    cfg: &DecorationConfig,
) {
    client.width = client.width.max(cfg.min_width as u32);
    client.height = client.height.max(cfg.min_height as u32);

    // (0,0) means "no position given". A window that really wants the
    // screen origin cannot be told apart and gets placed at the pointer.
    if client.x == 0 && client.y == 0 {
        pick_initial_position(display, client, cfg);
    }
}

/// Put the top of the frame's title bar at the pointer
///
/// Gravity is removed here because adoption applies it unconditionally
/// afterwards; the two cancel out.
pub fn pick_initial_position<D: DisplayServer + ?Sized>(
    display: &D,
    client: &mut Client,
    cfg: &DecorationConfig,
) {
    let (px, py) = match display.pointer_position() {
        Ok(pos) => pos,
        Err(e) => {
            warn!("Cannot query pointer for window 0x{:x}: {}", client.window, e);
            (0, 0)
        }
    };

    client.x = px;
    client.y = py + client.title_height(cfg) as i32;
    apply_gravity(client, GravityMode::Remove, cfg);
    debug!(
        "Placing window 0x{:x} at pointer ({}, {})",
        client.window, px, py
    );
}
