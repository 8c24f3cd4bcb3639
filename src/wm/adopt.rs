//! Adoption Module
//!
//! Turning a fresh top-level window into a managed, framed client, and
//! letting go of it again.
//!
//! Ordering matters throughout. The server turns some of our own requests
//! into UnmapNotify events that arrive later, indistinguishable from the
//! application unmapping itself. Every such request is preceded by
//! [`Client::expect_unmap`], and the event loop consumes the count before
//! deciding an unmap is real. Get this wrong and windows either vanish or
//! cannot be closed.

use tracing::{debug, error, info, warn};
use x11rb::protocol::xproto::Window;

use crate::config::{DecorationConfig, FeatureConfig, WindowColors};
use crate::shared::Geometry;
use crate::wm::client::{Client, WmState};
use crate::wm::decorations::{reparent, unparent};
use crate::wm::display::{clamp_i16, DisplayServer, WindowSnapshot};
use crate::wm::error::{AdoptError, DisplayResult};
use crate::wm::focus::{maybe_focus, refocus_after_release};
use crate::wm::gravity::{apply_gravity, fix_position, GravityMode};
use crate::wm::hints;
use crate::wm::hooks::Collaborators;
use crate::wm::placement::init_position;
use crate::wm::state::WindowManagerState;

/// What the transaction needs from the state besides the client itself
struct Settings {
    decorations: DecorationConfig,
    colors: WindowColors,
    features: FeatureConfig,
    screen: Geometry,
}

/// Manage `window`
///
/// The window must not be managed yet. On error the window is left alone:
/// no client, no frame, still a child of the root.
pub fn adopt<D, H>(
    state: &mut WindowManagerState,
    display: &D,
    hooks: &mut H,
    window: Window,
) -> Result<(), AdoptError>
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    let settings = Settings {
        decorations: state.decorations,
        colors: state.colors,
        features: state.features,
        screen: state.screen,
    };

    let client = match state.clients.push(Client::new(window)) {
        Ok(client) => client,
        Err(e) => {
            warn!("Not adopting window 0x{:x}: {}", window, e);
            return Err(AdoptError::AlreadyManaged(window));
        }
    };

    let mut was_viewable = false;
    let outcome = display
        .grab_server()
        .map_err(|source| AdoptError::Request { window, source })
        .and_then(|()| {
            display
                .window_attributes(window)
                .map_err(|source| AdoptError::WindowGone { window, source })
        })
        .and_then(|attrs| {
            was_viewable = attrs.viewable;
            frame_client(display, hooks, client, &attrs, &settings)
        });

    match outcome {
        Ok(mapped) => {
            let client = &*client;
            info!(
                "Managing window 0x{:x} {:?} at {},{} {}x{}{}",
                window,
                client.title,
                client.x,
                client.y,
                client.width,
                client.height,
                if client.hidden { " (iconic)" } else { "" }
            );
            if let Some(parent) = state.clients.transient_parent(window) {
                debug!("Window 0x{:x} is transient for 0x{:x}", window, parent.window);
            }
            if mapped {
                state.topmost = Some(window);
            }
            maybe_focus(state, hooks, window);
        }
        Err(ref e) => {
            error!("Failed to adopt window 0x{:x}: {}", window, e);
            abandon(state, display, window, was_viewable);
        }
    }

    finish_transaction(display);

    state.clients.reorder_by_x_position();
    hooks.redraw_taskbar(&state.clients);
    outcome.map(|_| ())
}

/// Snapshot, hints, geometry, frame and initial visibility
///
/// Returns true if the window was mapped, false if it starts iconic.
fn frame_client<D, H>(
    display: &D,
    hooks: &mut H,
    client: &mut Client,
    attrs: &WindowSnapshot,
    settings: &Settings,
) -> Result<bool, AdoptError>
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    let window = client.window;
    let cfg = &settings.decorations;

    client.transient_for = hints::read_transient_for(display, window);

    client.x = attrs.geometry.x;
    client.y = attrs.geometry.y;
    client.width = attrs.geometry.width;
    client.height = attrs.geometry.height;
    client.colormap = attrs.colormap;
    client.original_border_width = attrs.border_width;
    client.size_hints = hints::read_size_hints(display, window);
    hooks.update_title(client);

    if settings.features.mwm_hints {
        client.decorations = hints::read_decoration_hints(display, window).resolve();
    }

    // The reparent below always unmaps the window first, mapped or not
    client.expect_unmap();

    let wm_hints = hints::read_wm_hints(display, window).unwrap_or_default();
    client.accepts_input = wm_hints.input.unwrap_or(true);
    let startup_state = wm_hints.initial_state;
    let wm_state = if attrs.viewable {
        // Already on screen: we are replacing another window manager,
        // whose record of the state takes precedence
        hints::read_wm_state(display, window).or(startup_state)
    } else {
        init_position(display, client, cfg);
        startup_state
    };
    client.wm_state = match wm_state {
        Some(WmState::Iconic) => WmState::Iconic,
        _ => WmState::Normal,
    };
    hints::write_wm_state(display, window, client.wm_state);

    fix_position(client, settings.screen, cfg);
    apply_gravity(client, GravityMode::Apply, cfg);

    let frame = reparent(
        display,
        hooks,
        client,
        cfg,
        &settings.colors,
        settings.features.shape,
    )?;

    let request = |source| AdoptError::Request { window, source };
    if client.wm_state == WmState::Iconic {
        client.hidden = true;
        if attrs.viewable {
            client.expect_unmap();
            display.unmap_window(window).map_err(request)?;
        }
        Ok(false)
    } else {
        display.map_window(window).map_err(request)?;
        display.map_raised(frame).map_err(request)?;
        Ok(true)
    }
}

/// Drop a half-adopted window and undo whatever was done to it
///
/// A window that was on screen before is mapped again on the root.
fn abandon<D: DisplayServer + ?Sized>(
    state: &mut WindowManagerState,
    display: &D,
    window: Window,
    was_viewable: bool,
) {
    let Some(client) = state.clients.remove(window) else {
        return;
    };
    if state.focused == Some(window) {
        state.focused = None;
    }
    if state.topmost == Some(window) {
        state.topmost = None;
    }

    let Some(frame) = client.frame else {
        return;
    };
    // Get the window out before destroying the frame takes it along
    let undo = || -> DisplayResult<()> {
        display.reparent_window(window, display.root(), clamp_i16(client.x), clamp_i16(client.y))?;
        display.remove_from_save_set(window)?;
        if was_viewable {
            display.map_window(window)?;
        }
        display.destroy_window(frame)
    };
    if let Err(e) = undo() {
        warn!("Cleanup after failed adoption of 0x{:x} failed: {}", window, e);
    }
}

/// Flush, wait for the server, release the grab
fn finish_transaction<D: DisplayServer + ?Sized>(display: &D) {
    if let Err(e) = display.sync() {
        warn!("Sync with display server failed: {}", e);
    }
    if let Err(e) = display.ungrab_server() {
        warn!("Failed to ungrab server: {}", e);
    }
}

/// How a client is being let go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// The application withdrew the window
    Withdraw,
    /// We are exiting; leave the window mapped on the root
    Remap,
    /// The window no longer exists; only our frame is left to clean up
    Destroyed,
}

/// Stop managing `window`
///
/// Returns false if the window was not managed.
pub fn release<D, H>(
    state: &mut WindowManagerState,
    display: &D,
    hooks: &mut H,
    window: Window,
    mode: ReleaseMode,
) -> bool
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    let Some(mut client) = state.clients.remove(window) else {
        debug!("Release of unmanaged window 0x{:x} ignored", window);
        return false;
    };
    let cfg = state.decorations;

    let result = display.grab_server().and_then(|()| match mode {
        ReleaseMode::Destroyed => match client.frame.take() {
            Some(frame) => display.destroy_window(frame),
            None => Ok(()),
        },
        ReleaseMode::Withdraw => {
            hints::write_wm_state(display, window, WmState::Withdrawn);
            unparent(display, &mut client, &cfg, false)
        }
        ReleaseMode::Remap => unparent(display, &mut client, &cfg, true),
    });
    if let Err(e) = result {
        warn!("Releasing window 0x{:x} ({:?}) failed: {}", window, mode, e);
    }
    finish_transaction(display);

    info!("Released window 0x{:x} ({:?})", window, mode);

    if state.topmost == Some(window) {
        state.topmost = None;
    }
    if state.focused == Some(window) {
        refocus_after_release(state, hooks);
    }
    hooks.redraw_taskbar(&state.clients);
    true
}
