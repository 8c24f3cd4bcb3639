//! Focus Module
//!
//! Decides whether a client should get input focus. Actually focusing it is
//! the job of [`Collaborators::apply_focus`].

use tracing::debug;
use x11rb::protocol::xproto::Window;

use crate::wm::hooks::Collaborators;
use crate::wm::state::WindowManagerState;

/// Give `window` focus if nobody visible holds it and `window` is visible
///
/// Returns true if focus moved.
pub fn maybe_focus<H: Collaborators + ?Sized>(
    state: &mut WindowManagerState,
    hooks: &mut H,
    window: Window,
) -> bool {
    let focus_is_free = match state.focused_client() {
        None => true,
        Some(current) => current.hidden,
    };
    if !focus_is_free {
        return false;
    }

    let Some(client) = state.clients.get(window) else {
        return false;
    };
    if client.hidden {
        return false;
    }

    debug!("Focusing window 0x{:x}", window);
    hooks.apply_focus(client);
    state.focused = Some(window);
    true
}

/// Pick a new focus after the focused client went away
pub fn refocus_after_release<H: Collaborators + ?Sized>(
    state: &mut WindowManagerState,
    hooks: &mut H,
) {
    state.focused = None;
    let candidate = state
        .clients
        .iter()
        .rev()
        .find(|c| !c.hidden)
        .map(|c| c.window);
    if let Some(window) = candidate {
        maybe_focus(state, hooks, window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::shared::Geometry;
    use crate::wm::client::Client;
    use crate::wm::testing::RecordingHooks;

    fn state_with(clients: &[(Window, bool)]) -> WindowManagerState {
        let mut state = WindowManagerState::new(&Config::default(), Geometry::new(0, 0, 1024, 768));
        for &(window, hidden) in clients {
            let mut c = Client::new(window);
            c.hidden = hidden;
            state.clients.push(c).unwrap();
        }
        state
    }

    #[test]
    fn test_first_visible_client_gets_focus() {
        let mut state = state_with(&[(1, false)]);
        let mut hooks = RecordingHooks::default();
        assert!(maybe_focus(&mut state, &mut hooks, 1));
        assert_eq!(state.focused, Some(1));
        assert_eq!(hooks.focused, vec![1]);
    }

    #[test]
    fn test_iconic_client_never_steals_focus() {
        let mut state = state_with(&[(1, false), (2, true)]);
        state.focused = Some(1);
        let mut hooks = RecordingHooks::default();
        assert!(!maybe_focus(&mut state, &mut hooks, 2));
        assert_eq!(state.focused, Some(1));
        assert!(hooks.focused.is_empty());
    }

    #[test]
    fn test_hidden_client_not_focused_even_when_free() {
        let mut state = state_with(&[(2, true)]);
        let mut hooks = RecordingHooks::default();
        assert!(!maybe_focus(&mut state, &mut hooks, 2));
        assert_eq!(state.focused, None);
    }

    #[test]
    fn test_focus_moves_off_hidden_client() {
        let mut state = state_with(&[(1, true), (2, false)]);
        state.focused = Some(1);
        let mut hooks = RecordingHooks::default();
        assert!(maybe_focus(&mut state, &mut hooks, 2));
        assert_eq!(state.focused, Some(2));
    }

    #[test]
    fn test_visible_focus_kept() {
        let mut state = state_with(&[(1, false), (2, false)]);
        state.focused = Some(1);
        let mut hooks = RecordingHooks::default();
        assert!(!maybe_focus(&mut state, &mut hooks, 2));
        assert_eq!(state.focused, Some(1));
    }

    #[test]
    fn test_refocus_picks_last_visible() {
        let mut state = state_with(&[(1, false), (2, false), (3, true)]);
        let mut hooks = RecordingHooks::default();
        refocus_after_release(&mut state, &mut hooks);
        assert_eq!(state.focused, Some(2));
    }
}
