//! Interned atoms
//!
//! Only the atoms the adoption protocol reads or writes. Predefined atoms
//! (`WM_HINTS`, `WM_NORMAL_HINTS`, `WM_TRANSIENT_FOR`, `WM_NAME`) come from
//! [`AtomEnum`](x11rb::protocol::xproto::AtomEnum) and are not interned.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, ConnectionExt as _};

use crate::wm::error::DisplayResult;

/// Holds all interned atoms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atoms {
    pub wm_state: Atom,
    // MOTIF WM Hints (for decoration control)
    pub motif_wm_hints: Atom,
    pub net_wm_name: Atom,
    pub utf8_string: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> DisplayResult<Self> {
        // Send every request before waiting on the first reply
        let wm_state = conn.intern_atom(false, b"WM_STATE")?;
        let motif_wm_hints = conn.intern_atom(false, b"_MOTIF_WM_HINTS")?;
        let net_wm_name = conn.intern_atom(false, b"_NET_WM_NAME")?;
        let utf8_string = conn.intern_atom(false, b"UTF8_STRING")?;

        Ok(Self {
            wm_state: wm_state.reply()?.atom,
            motif_wm_hints: motif_wm_hints.reply()?.atom,
            net_wm_name: net_wm_name.reply()?.atom,
            utf8_string: utf8_string.reply()?.atom,
        })
    }
}
