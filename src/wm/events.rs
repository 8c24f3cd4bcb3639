//! Events Module
//!
//! Routes X events to the adoption and release transactions.
//!
//! UnmapNotify handling is where the expected-unmap counter is paid back:
//! each unmap we provoked ourselves is swallowed exactly once, and only an
//! unmap beyond the count means the application withdrew the window.

use tracing::{debug, warn};
use x11rb::protocol::xproto::{AtomEnum, ConfigWindow, ConfigureRequestEvent, Window};
use x11rb::protocol::Event;

use crate::wm::adopt::{adopt, release, ReleaseMode};
use crate::wm::client::WmState;
use crate::wm::display::{DisplayServer, WindowChanges};
use crate::wm::error::DisplayResult;
use crate::wm::focus::maybe_focus;
use crate::wm::gravity::{apply_gravity, fix_position, GravityMode};
use crate::wm::hints;
use crate::wm::hooks::Collaborators;
use crate::wm::state::WindowManagerState;

/// Result of event handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Handled,
    Ignore,
}

pub fn dispatch<D, H>(
    state: &mut WindowManagerState,
    display: &D,
    hooks: &mut H,
    event: &Event,
) -> EventResult
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    match event {
        Event::MapRequest(e) => {
            debug!("MapRequest: window 0x{:x}", e.window);
            if state.clients.contains(e.window) {
                show(state, display, hooks, e.window);
            } else if let Err(err) = adopt(state, display, hooks, e.window) {
                warn!("MapRequest for 0x{:x} not honored: {}", e.window, err);
            }
            EventResult::Handled
        }
        Event::UnmapNotify(e) => {
            let Some(client) = state.clients.get_mut(e.window) else {
                return EventResult::Ignore;
            };
            if client.consume_expected_unmap() {
                debug!(
                    "UnmapNotify: expected for 0x{:x}, {} more to go",
                    e.window, client.ignore_unmap
                );
                return EventResult::Ignore;
            }
            debug!("UnmapNotify: 0x{:x} withdrawn", e.window);
            release(state, display, hooks, e.window, ReleaseMode::Withdraw);
            EventResult::Handled
        }
        Event::DestroyNotify(e) => {
            if release(state, display, hooks, e.window, ReleaseMode::Destroyed) {
                EventResult::Handled
            } else {
                EventResult::Ignore
            }
        }
        Event::ConfigureRequest(e) => {
            if let Err(err) = configure_request(state, display, hooks, e) {
                warn!("ConfigureRequest for 0x{:x} failed: {}", e.window, err);
            }
            EventResult::Handled
        }
        Event::PropertyNotify(e) => {
            let Some(client) = state.clients.get_mut(e.window) else {
                return EventResult::Ignore;
            };
            if e.atom == u32::from(AtomEnum::WM_NAME) || e.atom == display.atoms().net_wm_name {
                hooks.update_title(client);
                hooks.redraw_taskbar(&state.clients);
                EventResult::Handled
            } else if e.atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
                client.size_hints = hints::read_size_hints(display, e.window);
                EventResult::Handled
            } else if e.atom == u32::from(AtomEnum::WM_HINTS) {
                let wm_hints = hints::read_wm_hints(display, e.window).unwrap_or_default();
                client.accepts_input = wm_hints.input.unwrap_or(true);
                EventResult::Handled
            } else {
                EventResult::Ignore
            }
        }
        Event::ColormapNotify(e) => match state.clients.get_mut(e.window) {
            Some(client) if e.new => {
                client.colormap = e.colormap;
                EventResult::Handled
            }
            _ => EventResult::Ignore,
        },
        Event::ShapeNotify(e) => {
            if !state.features.shape {
                return EventResult::Ignore;
            }
            let cfg = state.decorations;
            match state.clients.get_mut(e.affected_window) {
                Some(client) => {
                    hooks.set_shape(client, &cfg);
                    EventResult::Handled
                }
                None => EventResult::Ignore,
            }
        }
        Event::Error(e) => {
            warn!("X11 error: {:?}", e);
            EventResult::Handled
        }
        _ => EventResult::Ignore,
    }
}

/// Bring an iconic client back on screen
fn show<D, H>(state: &mut WindowManagerState, display: &D, hooks: &mut H, window: Window)
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    let Some(client) = state.clients.get_mut(window) else {
        return;
    };
    if !client.hidden {
        return;
    }
    client.was_hidden = true;
    client.hidden = false;
    client.wm_state = WmState::Normal;
    let frame = client.frame;

    hints::write_wm_state(display, window, WmState::Normal);
    let map = || -> DisplayResult<()> {
        display.map_window(window)?;
        if let Some(frame) = frame {
            display.map_raised(frame)?;
        }
        Ok(())
    };
    if let Err(e) = map() {
        warn!("Failed to map window 0x{:x}: {}", window, e);
        return;
    }
    state.topmost = Some(window);
    maybe_focus(state, hooks, window);
    hooks.redraw_taskbar(&state.clients);
}

fn configure_request<D, H>(
    state: &mut WindowManagerState,
    display: &D,
    hooks: &mut H,
    e: &ConfigureRequestEvent,
) -> DisplayResult<()>
where
    D: DisplayServer + ?Sized,
    H: Collaborators + ?Sized,
{
    let cfg = state.decorations;
    let screen = state.screen;
    let Some(client) = state.clients.get_mut(e.window) else {
        // Not ours; do exactly what was asked
        return display.configure_window(e.window, &WindowChanges::from_request(e));
    };

    let mask = u16::from(e.value_mask);
    let has = |bit: ConfigWindow| mask & u16::from(bit) != 0;

    apply_gravity(client, GravityMode::Remove, &cfg);
    if has(ConfigWindow::X) {
        client.x = e.x as i32;
    }
    if has(ConfigWindow::Y) {
        client.y = e.y as i32;
    }
    if has(ConfigWindow::WIDTH) {
        client.width = e.width as u32;
    }
    if has(ConfigWindow::HEIGHT) {
        client.height = e.height as u32;
    }
    fix_position(client, screen, &cfg);
    apply_gravity(client, GravityMode::Apply, &cfg);

    if let Some(frame) = client.frame {
        let outer = client.frame_geometry(&cfg);
        let mut changes = WindowChanges::geometry(outer);
        changes.width = Some(client.width);
        changes.height = Some(client.height + client.title_height(&cfg));
        display.configure_window(frame, &changes)?;
    }
    display.resize_window(e.window, client.width, client.height)?;
    display.send_configure_notify(e.window, client.geometry())?;

    state.clients.reorder_by_x_position();
    hooks.redraw_taskbar(&state.clients);
    Ok(())
}
