//! Collaborators
//!
//! Title cache, shape, focus and taskbar live outside the adoption protocol.
//! It reaches them only through [`Collaborators`]; every method defaults to
//! doing nothing so a collaborator can implement just what it has.

use std::sync::Arc;
use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::config::DecorationConfig;
use crate::wm::atoms::Atoms;
use crate::wm::client::Client;
use crate::wm::registry::ClientRegistry;

pub trait Collaborators {
    /// Refresh `client.title` from the window's properties
    fn update_title(&mut self, _client: &mut Client) {}

    /// Make the frame follow the application window's shape
    fn set_shape(&mut self, _client: &mut Client, _cfg: &DecorationConfig) {}

    /// Hand input focus to the client
    fn apply_focus(&mut self, _client: &Client) {}

    fn redraw_taskbar(&mut self, _clients: &ClientRegistry) {}
}

/// Collaborators backed by the X connection
pub struct X11Hooks {
    conn: Arc<RustConnection>,
    atoms: Atoms,
}

impl X11Hooks {
    pub fn new(conn: Arc<RustConnection>, atoms: Atoms) -> Self {
        Self { conn, atoms }
    }

    fn read_text(&self, window: Window, property: Atom, type_: Atom) -> Option<String> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, 1024)
            .ok()?
            .reply()
            .ok()?;
        if reply.format != 8 || reply.value.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&reply.value).into_owned())
    }

    fn shape_frame(&self, client: &mut Client, frame: Window, cfg: &DecorationConfig) -> anyhow::Result<()> {
        self.conn.shape_select_input(client.window, true)?;
        let extents = self.conn.shape_query_extents(client.window)?.reply()?;

        let title = client.title_height(cfg);
        let bw = client.border_width(cfg) as i16;

        if extents.bounding_shaped {
            self.conn.shape_combine(
                shape::SO::SET,
                shape::SK::BOUNDING,
                shape::SK::BOUNDING,
                frame,
                0,
                title as i16,
                client.window,
            )?;
            // Keep the title bar and its border solid
            let bar = Rectangle {
                x: -bw,
                y: -bw,
                width: (client.width + 2 * bw as u32) as u16,
                height: (title + bw as u32) as u16,
            };
            self.conn.shape_rectangles(
                shape::SO::UNION,
                shape::SK::BOUNDING,
                ClipOrdering::YX_BANDED,
                frame,
                0,
                0,
                &[bar],
            )?;
            client.has_been_shaped = true;
        } else if client.has_been_shaped {
            // Window lost its shape, make the frame rectangular again
            let whole = Rectangle {
                x: -bw,
                y: -bw,
                width: (client.width + 2 * bw as u32) as u16,
                height: (client.height + title + 2 * bw as u32) as u16,
            };
            self.conn.shape_rectangles(
                shape::SO::SET,
                shape::SK::BOUNDING,
                ClipOrdering::YX_BANDED,
                frame,
                0,
                0,
                &[whole],
            )?;
            client.has_been_shaped = false;
        }
        Ok(())
    }
}

impl Collaborators for X11Hooks {
    fn update_title(&mut self, client: &mut Client) {
        let title = self
            .read_text(client.window, self.atoms.net_wm_name, self.atoms.utf8_string)
            .or_else(|| self.read_text(client.window, AtomEnum::WM_NAME.into(), AtomEnum::ANY.into()));
        client.title = title.unwrap_or_default();
        debug!("Title of 0x{:x} is {:?}", client.window, client.title);
    }

    fn set_shape(&mut self, client: &mut Client, cfg: &DecorationConfig) {
        let Some(frame) = client.frame else {
            return;
        };
        if let Err(e) = self.shape_frame(client, frame, cfg) {
            warn!("Failed to shape frame of window 0x{:x}: {}", client.window, e);
        }
    }

    fn apply_focus(&mut self, client: &Client) {
        let focus = || -> Result<(), x11rb::errors::ConnectionError> {
            if client.accepts_input {
                self.conn
                    .set_input_focus(InputFocus::POINTER_ROOT, client.window, x11rb::CURRENT_TIME)?;
            } else {
                debug!("Window 0x{:x} refuses input focus", client.window);
            }
            if client.colormap != x11rb::NONE {
                self.conn.install_colormap(client.colormap)?;
            }
            self.conn.flush()
        };
        if let Err(e) = focus() {
            warn!("Failed to focus window 0x{:x}: {}", client.window, e);
        }
    }

    fn redraw_taskbar(&mut self, clients: &ClientRegistry) {
        let titles: Vec<&str> = clients.iter().map(|c| c.title.as_str()).collect();
        debug!("Taskbar: {:?}", titles);
    }
}
