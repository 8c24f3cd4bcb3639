//! Window frames
//!
//! Creating the decoration frame and moving the application window into it,
//! and the reverse.

use tracing::debug;
use x11rb::protocol::xproto::{EventMask, Window};

use crate::config::{DecorationConfig, WindowColors};
use crate::wm::client::Client;
use crate::wm::display::{clamp_i16, clamp_u16, DisplayServer, FrameSpec};
use crate::wm::error::{AdoptError, DisplayResult};
use crate::wm::gravity::{apply_gravity, GravityMode};
use crate::wm::hooks::Collaborators;

/// Events the frame listens to on behalf of the application window
pub fn frame_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::BUTTON_PRESS
        | EventMask::EXPOSURE
        | EventMask::ENTER_WINDOW
}

/// All the application window still reports to us once framed
pub fn client_event_mask() -> EventMask {
    EventMask::COLOR_MAP_CHANGE | EventMask::PROPERTY_CHANGE
}

/// Build the frame for `client` and reparent the application window into it
///
/// The reparent makes the server unmap the window first, so the caller must
/// already have bumped `client.ignore_unmap`. On error `client.frame` is set
/// if the frame exists, so the caller can destroy it.
pub fn reparent<D, H>(
    display: &D,
    hooks: &mut H,
    client: &mut Client,
    cfg: &DecorationConfig,
    colors: &WindowColors,
    shape: bool,
) -> Result<Window, AdoptError>
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    let window = client.window;
    let title = client.title_height(cfg);
    let outer = client.frame_geometry(cfg);

    let spec = FrameSpec {
        x: clamp_i16(outer.x),
        y: clamp_i16(outer.y),
        width: clamp_u16(client.width),
        height: clamp_u16(client.height + title),
        border_width: client.border_width(cfg) as u16,
        background: colors.background,
        border_color: colors.border,
        event_mask: frame_event_mask(),
        override_redirect: true,
    };
    let frame = display
        .create_frame(&spec)
        .map_err(|source| AdoptError::FrameCreation { window, source })?;
    client.frame = Some(frame);

    if shape {
        hooks.set_shape(client, cfg);
    }

    attach(display, client, frame, title).map_err(|source| AdoptError::Request { window, source })?;

    debug!("Reparented 0x{:x} into frame 0x{:x}", window, frame);
    Ok(frame)
}

fn attach<D: DisplayServer + ?Sized>(
    display: &D,
    client: &Client,
    frame: Window,
    title: u32,
) -> DisplayResult<()> {
    let window = client.window;
    // Survive an unexpected exit of ours
    display.add_to_save_set(window)?;
    display.select_input(window, client_event_mask())?;
    display.set_border_width(window, 0)?;
    display.resize_window(window, client.width, client.height)?;
    display.reparent_window(window, frame, 0, clamp_i16(title as i32))?;
    // A reparent alone does not give the application a usable ConfigureNotify
    display.send_configure_notify(window, client.geometry())?;
    Ok(())
}

/// Hand the application window back to the root and destroy the frame
///
/// The window lands where its frame was, as if it had never been decorated.
/// With `remap` it is mapped again so it survives our exit.
pub fn unparent<D: DisplayServer + ?Sized>(
    display: &D,
    client: &mut Client,
    cfg: &DecorationConfig,
    remap: bool,
) -> DisplayResult<()> {
    let window = client.window;
    apply_gravity(client, GravityMode::Remove, cfg);

    display.unmap_window(window)?;
    display.reparent_window(window, display.root(), clamp_i16(client.x), clamp_i16(client.y))?;
    display.set_border_width(window, client.original_border_width)?;
    display.remove_from_save_set(window)?;
    if remap {
        display.map_window(window)?;
    }
    if let Some(frame) = client.frame.take() {
        display.destroy_window(frame)?;
    }
    Ok(())
}
