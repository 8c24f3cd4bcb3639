//! Window Manager Module
//!
//! Client adoption, decoration and release on top of an X11 connection.

pub mod adopt;
pub mod atoms;
pub mod client;
pub mod decorations;
pub mod display;
pub mod error;
pub mod events;
pub mod focus;
pub mod gravity;
pub mod hints;
pub mod hooks;
pub mod placement;
pub mod registry;
pub mod state;

#[cfg(test)]
pub mod testing;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::shape;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::config::Config;
use crate::shared::Geometry;
use crate::wm::adopt::{adopt, release, ReleaseMode};
use crate::wm::atoms::Atoms;
use crate::wm::display::{DisplayServer, X11Display};
use crate::wm::events::EventResult;
use crate::wm::hooks::{Collaborators, X11Hooks};
use crate::wm::state::WindowManagerState;

pub struct WindowManager {
    display: X11Display,
    hooks: X11Hooks,
    state: WindowManagerState,
}

impl WindowManager {
    /// Become the window manager of `screen_num`
    ///
    /// Fails if another window manager already holds SubstructureRedirect on
    /// the root.
    pub fn new(conn: Arc<RustConnection>, screen_num: usize, config: &Config) -> Result<Self> {
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let screen_geometry = Geometry::new(
            0,
            0,
            screen.width_in_pixels as u32,
            screen.height_in_pixels as u32,
        );
        info!(
            "Initializing window manager on screen {} ({}x{})",
            screen_num, screen_geometry.width, screen_geometry.height
        );

        debug!("WM: Selecting events on root window (SubstructureRedirect)...");
        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new().event_mask(
                EventMask::SUBSTRUCTURE_REDIRECT
                    | EventMask::SUBSTRUCTURE_NOTIFY
                    | EventMask::PROPERTY_CHANGE,
            ),
        )?
        .check()
        .context("Failed to select events on root window - is another WM running?")?;

        let atoms = Atoms::new(conn.as_ref()).context("Failed to intern atoms")?;

        let mut state = WindowManagerState::new(config, screen_geometry);
        if state.features.shape {
            let available = conn
                .extension_information(shape::X11_EXTENSION_NAME)?
                .is_some();
            if !available {
                warn!("SHAPE extension not available, frames stay rectangular");
            }
            state.features.shape = available;
        }
        info!(
            "WM: shape={}, mwm_hints={}",
            state.features.shape, state.features.mwm_hints
        );

        Ok(Self {
            display: X11Display::new(conn.clone(), screen_num, atoms),
            hooks: X11Hooks::new(conn, atoms),
            state,
        })
    }

    /// Adopt windows that were already on screen when we started
    pub fn scan_windows(&mut self) {
        scan_windows(&mut self.state, &self.display, &mut self.hooks);
    }

    pub fn handle_event(&mut self, event: &Event) -> EventResult {
        events::dispatch(&mut self.state, &self.display, &mut self.hooks, event)
    }

    /// Give every window back to the root so it survives our exit
    pub fn shutdown(&mut self) {
        release_all(&mut self.state, &self.display, &mut self.hooks);
        if let Err(e) = self.display.connection().flush() {
            warn!("Failed to flush on shutdown: {}", e);
        }
    }
}

/// Adopt every mapped, non-override-redirect child of the root
pub fn scan_windows<D, H>(state: &mut WindowManagerState, display: &D, hooks: &mut H)
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    let children = match display.query_children() {
        Ok(children) => children,
        Err(e) => {
            warn!("Failed to query existing windows: {}", e);
            return;
        }
    };

    let mut adopted = 0;
    for window in children {
        let attrs = match display.window_attributes(window) {
            Ok(attrs) => attrs,
            Err(e) => {
                debug!("Skipping window 0x{:x}: {}", window, e);
                continue;
            }
        };
        if attrs.override_redirect || !attrs.viewable || state.clients.contains(window) {
            continue;
        }
        match adopt(state, display, hooks, window) {
            Ok(()) => adopted += 1,
            Err(e) => warn!("Failed to adopt existing window 0x{:x}: {}", window, e),
        }
    }
    info!("Adopted {} existing windows", adopted);
}

pub fn release_all<D, H>(state: &mut WindowManagerState, display: &D, hooks: &mut H)
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    if state.clients.is_empty() {
        return;
    }
    info!("Releasing {} clients", state.clients.len());
    for window in state.clients.windows() {
        release(state, display, hooks, window, ReleaseMode::Remap);
    }
}
