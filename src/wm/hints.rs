//! Hints Module
//!
//! Window hints reading (WM_NORMAL_HINTS, WM_HINTS, WM_TRANSIENT_FOR, WM_STATE
//! and the Motif decoration hints).
//!
//! Parsing is split from fetching: the `parse_*` functions are pure over a
//! [`RawProperty`], the `read_*` functions fetch and never fail. A property
//! that cannot be read or does not parse is logged and treated as absent.

use bitflags::bitflags;
use tracing::{debug, warn};
use x11rb::protocol::xproto::{AtomEnum, Window};

use crate::wm::client::WmState;
use crate::wm::display::{DisplayServer, RawProperty};

bitflags! {
    /// `WM_NORMAL_HINTS` flags field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SizeHintFlags: u32 {
        const US_POSITION = 1 << 0;
        const US_SIZE = 1 << 1;
        const P_POSITION = 1 << 2;
        const P_SIZE = 1 << 3;
        const P_MIN_SIZE = 1 << 4;
        const P_MAX_SIZE = 1 << 5;
        const P_RESIZE_INC = 1 << 6;
        const P_ASPECT = 1 << 7;
        const P_BASE_SIZE = 1 << 8;
        const P_WIN_GRAVITY = 1 << 9;
    }
}

/// Full ICCCM size hints record
pub const SIZE_HINTS_ELEMENTS: usize = 18;
/// Pre-ICCCM record, lacking base size and gravity
const OLD_SIZE_HINTS_ELEMENTS: usize = 15;

/// Size hints (XSizeHints equivalent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeHints {
    pub flags: SizeHintFlags,
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub base_width: u32,
    pub base_height: u32,
    /// Raw ICCCM gravity; only meaningful with `P_WIN_GRAVITY`
    pub win_gravity: u32,
}

impl SizeHints {
    /// Minimum size; the base size stands in for it when only that is given
    pub fn min_size(&self) -> Option<(u32, u32)> {
        if self.flags.contains(SizeHintFlags::P_MIN_SIZE) {
            Some((self.min_width, self.min_height))
        } else if self.flags.contains(SizeHintFlags::P_BASE_SIZE) {
            Some((self.base_width, self.base_height))
        } else {
            None
        }
    }

    /// Zero in either dimension means "unbounded" there
    pub fn max_size(&self) -> Option<(u32, u32)> {
        self.flags
            .contains(SizeHintFlags::P_MAX_SIZE)
            .then_some((self.max_width, self.max_height))
    }

    pub fn gravity(&self) -> Option<u32> {
        self.flags
            .contains(SizeHintFlags::P_WIN_GRAVITY)
            .then_some(self.win_gravity)
    }
}

/// Size hints from a raw `WM_NORMAL_HINTS` property
pub fn parse_size_hints(prop: &RawProperty) -> Option<SizeHints> {
    if prop.is_absent() || prop.type_ != u32::from(AtomEnum::WM_SIZE_HINTS) {
        return None;
    }
    let values = prop.value32()?;
    if values.len() < OLD_SIZE_HINTS_ELEMENTS {
        return None;
    }

    let mut flags = SizeHintFlags::from_bits_truncate(values[0]);
    let (base_width, base_height, win_gravity) = if values.len() >= SIZE_HINTS_ELEMENTS {
        (values[15], values[16], values[17])
    } else {
        flags.remove(SizeHintFlags::P_BASE_SIZE | SizeHintFlags::P_WIN_GRAVITY);
        (0, 0, 0)
    };

    // Negative limits are nonsense; treat them as unset
    let non_negative = |v: u32| if (v as i32) < 0 { 0 } else { v };

    Some(SizeHints {
        flags,
        min_width: non_negative(values[5]),
        min_height: non_negative(values[6]),
        max_width: non_negative(values[7]),
        max_height: non_negative(values[8]),
        base_width: non_negative(base_width),
        base_height: non_negative(base_height),
        win_gravity,
    })
}

const WM_HINTS_INPUT: u32 = 1 << 0;
const WM_HINTS_STATE: u32 = 1 << 1;
/// Xlib accepts a record missing the trailing window group
const WM_HINTS_MIN_ELEMENTS: usize = 8;

/// The part of WM_HINTS the adoption path uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WmHints {
    /// `None` unless InputHint is set
    pub input: Option<bool>,
    /// `None` unless StateHint is set
    pub initial_state: Option<WmState>,
}

pub fn parse_wm_hints(prop: &RawProperty) -> Option<WmHints> {
    if prop.is_absent() || prop.type_ != u32::from(AtomEnum::WM_HINTS) {
        return None;
    }
    let values = prop.value32()?;
    if values.len() < WM_HINTS_MIN_ELEMENTS {
        return None;
    }

    let flags = values[0];
    let input = (flags & WM_HINTS_INPUT != 0).then_some(values[1] != 0);
    let initial_state = if flags & WM_HINTS_STATE != 0 {
        WmState::from_u32(values[2])
    } else {
        None
    };
    Some(WmHints {
        input,
        initial_state,
    })
}

pub fn parse_transient_for(prop: &RawProperty) -> Option<Window> {
    if prop.type_ != u32::from(AtomEnum::WINDOW) {
        return None;
    }
    prop.value32()?
        .first()
        .copied()
        .filter(|&w| w != x11rb::NONE)
}

/// The state recorded in a `WM_STATE` property (first CARD32)
pub fn parse_wm_state(prop: &RawProperty, wm_state_atom: u32) -> Option<WmState> {
    if prop.type_ != wm_state_atom {
        return None;
    }
    prop.value32()?.first().copied().and_then(WmState::from_u32)
}

const MWM_HINTS_ELEMENTS: usize = 5;
const MWM_HINTS_DECORATIONS: u32 = 1 << 1;
const MWM_DECOR_ALL: u32 = 1 << 0;
const MWM_DECOR_BORDER: u32 = 1 << 1;
const MWM_DECOR_TITLE: u32 = 1 << 3;

bitflags! {
    /// Decorations a frame draws
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Decorations: u8 {
        const TITLE = 1 << 0;
        const BORDER = 1 << 1;
    }
}

impl Default for Decorations {
    fn default() -> Self {
        Decorations::all()
    }
}

/// Outcome of reading `_MOTIF_WM_HINTS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationHint {
    /// Absent, malformed, or not restricting anything
    NoOpinion,
    /// Only these decorations may be drawn
    Restrict(Decorations),
}

impl DecorationHint {
    pub fn resolve(self) -> Decorations {
        match self {
            DecorationHint::NoOpinion => Decorations::default(),
            DecorationHint::Restrict(decorations) => decorations,
        }
    }
}

/// Why a Motif hints property was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MwmHintsDefect {
    WrongType,
    WrongFormat(u8),
    TooShort(usize),
}

/// Decoration hint from a raw `_MOTIF_WM_HINTS` property
///
/// The property type must be `_MOTIF_WM_HINTS` itself, as Motif writes it.
pub fn parse_mwm_hints(
    prop: &RawProperty,
    mwm_atom: u32,
) -> Result<DecorationHint, MwmHintsDefect> {
    if prop.is_absent() {
        return Ok(DecorationHint::NoOpinion);
    }
    if prop.type_ != mwm_atom {
        return Err(MwmHintsDefect::WrongType);
    }
    let values = prop.value32().ok_or(MwmHintsDefect::WrongFormat(prop.format))?;
    if values.len() < MWM_HINTS_ELEMENTS {
        return Err(MwmHintsDefect::TooShort(values.len()));
    }

    let (flags, decor) = (values[0], values[2]);
    if flags & MWM_HINTS_DECORATIONS == 0 || decor & MWM_DECOR_ALL != 0 {
        return Ok(DecorationHint::NoOpinion);
    }

    let mut allowed = Decorations::empty();
    allowed.set(Decorations::TITLE, decor & MWM_DECOR_TITLE != 0);
    allowed.set(Decorations::BORDER, decor & MWM_DECOR_BORDER != 0);
    Ok(DecorationHint::Restrict(allowed))
}

fn fetch<D: DisplayServer + ?Sized>(
    display: &D,
    window: Window,
    property: u32,
    type_: u32,
    long_length: u32,
    what: &str,
) -> RawProperty {
    match display.get_property(window, property, type_, long_length) {
        Ok(prop) => prop,
        Err(e) => {
            warn!("Cannot read {} for window 0x{:x}: {}", what, window, e);
            RawProperty::absent()
        }
    }
}

/// Size hints, or all-default hints when absent
pub fn read_size_hints<D: DisplayServer + ?Sized>(display: &D, window: Window) -> SizeHints {
    let prop = fetch(
        display,
        window,
        AtomEnum::WM_NORMAL_HINTS.into(),
        AtomEnum::WM_SIZE_HINTS.into(),
        SIZE_HINTS_ELEMENTS as u32,
        "WM_NORMAL_HINTS",
    );
    if prop.is_absent() {
        return SizeHints::default();
    }
    parse_size_hints(&prop).unwrap_or_else(|| {
        warn!("Malformed WM_NORMAL_HINTS on window 0x{:x}, using defaults", window);
        SizeHints::default()
    })
}

pub fn read_wm_hints<D: DisplayServer + ?Sized>(display: &D, window: Window) -> Option<WmHints> {
    let prop = fetch(
        display,
        window,
        AtomEnum::WM_HINTS.into(),
        AtomEnum::WM_HINTS.into(),
        9,
        "WM_HINTS",
    );
    if prop.is_absent() {
        return None;
    }
    let hints = parse_wm_hints(&prop);
    if hints.is_none() {
        warn!("Malformed WM_HINTS on window 0x{:x}, ignoring", window);
    }
    hints
}

pub fn read_transient_for<D: DisplayServer + ?Sized>(
    display: &D,
    window: Window,
) -> Option<Window> {
    let prop = fetch(
        display,
        window,
        AtomEnum::WM_TRANSIENT_FOR.into(),
        AtomEnum::WINDOW.into(),
        1,
        "WM_TRANSIENT_FOR",
    );
    parse_transient_for(&prop)
}

/// State left in `WM_STATE` by ourselves or a previous window manager
pub fn read_wm_state<D: DisplayServer + ?Sized>(display: &D, window: Window) -> Option<WmState> {
    let atom = display.atoms().wm_state;
    let prop = fetch(display, window, atom, atom, 2, "WM_STATE");
    parse_wm_state(&prop, atom)
}

pub fn write_wm_state<D: DisplayServer + ?Sized>(display: &D, window: Window, state: WmState) {
    let atom = display.atoms().wm_state;
    // Second field is the icon window; we never have one
    if let Err(e) = display.change_property32(window, atom, atom, &[state as u32, x11rb::NONE]) {
        warn!("Cannot set WM_STATE on window 0x{:x}: {}", window, e);
    }
}

/// Motif decoration request for a window
pub fn read_decoration_hints<D: DisplayServer + ?Sized>(
    display: &D,
    window: Window,
) -> DecorationHint {
    let atom = display.atoms().motif_wm_hints;
    let prop = fetch(
        display,
        window,
        atom,
        atom,
        MWM_HINTS_ELEMENTS as u32,
        "_MOTIF_WM_HINTS",
    );
    match parse_mwm_hints(&prop, atom) {
        Ok(hint) => {
            if let DecorationHint::Restrict(decorations) = hint {
                debug!("Window 0x{:x} restricts decorations to {:?}", window, decorations);
            }
            hint
        }
        Err(MwmHintsDefect::WrongType) | Err(MwmHintsDefect::WrongFormat(_)) => {
            warn!("Bad _MOTIF_WM_HINTS property read for window 0x{:x}", window);
            DecorationHint::NoOpinion
        }
        Err(MwmHintsDefect::TooShort(found)) => {
            warn!(
                "_MOTIF_WM_HINTS too small for window 0x{:x} (missing {} of {} elements)",
                window,
                MWM_HINTS_ELEMENTS - found,
                MWM_HINTS_ELEMENTS
            );
            DecorationHint::NoOpinion
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MWM: u32 = 300;

    fn size_prop(values: &[u32]) -> RawProperty {
        RawProperty::from_u32s(AtomEnum::WM_SIZE_HINTS.into(), values)
    }

    #[test]
    fn test_full_size_hints() {
        let mut values = [0u32; SIZE_HINTS_ELEMENTS];
        values[0] = (SizeHintFlags::P_MIN_SIZE | SizeHintFlags::P_WIN_GRAVITY).bits();
        values[5] = 100;
        values[6] = 50;
        values[17] = 9;

        let hints = parse_size_hints(&size_prop(&values)).unwrap();
        assert_eq!(hints.min_size(), Some((100, 50)));
        assert_eq!(hints.max_size(), None);
        assert_eq!(hints.gravity(), Some(9));
    }

    #[test]
    fn test_pre_icccm_size_hints_drop_gravity() {
        let mut values = [0u32; OLD_SIZE_HINTS_ELEMENTS];
        values[0] = (SizeHintFlags::P_MAX_SIZE | SizeHintFlags::P_WIN_GRAVITY).bits();
        values[7] = 640;
        values[8] = 480;

        let hints = parse_size_hints(&size_prop(&values)).unwrap();
        assert_eq!(hints.max_size(), Some((640, 480)));
        assert_eq!(hints.gravity(), None);
    }

    #[test]
    fn test_base_size_stands_in_for_minimum() {
        let mut values = [0u32; SIZE_HINTS_ELEMENTS];
        values[0] = SizeHintFlags::P_BASE_SIZE.bits();
        values[15] = 40;
        values[16] = 30;
        let hints = parse_size_hints(&size_prop(&values)).unwrap();
        assert_eq!(hints.min_size(), Some((40, 30)));
    }

    #[test]
    fn test_truncated_size_hints_rejected() {
        assert!(parse_size_hints(&size_prop(&[0; 10])).is_none());
        assert!(parse_size_hints(&RawProperty::absent()).is_none());
    }

    #[test]
    fn test_wm_hints_initial_state() {
        let prop = RawProperty::from_u32s(
            AtomEnum::WM_HINTS.into(),
            &[WM_HINTS_STATE | 1, 1, 3, 0, 0, 0, 0, 0, 0],
        );
        let hints = parse_wm_hints(&prop).unwrap();
        assert_eq!(hints.initial_state, Some(WmState::Iconic));

        // State field is ignored without StateHint
        let prop = RawProperty::from_u32s(AtomEnum::WM_HINTS.into(), &[0, 0, 3, 0, 0, 0, 0, 0]);
        let hints = parse_wm_hints(&prop).unwrap();
        assert_eq!(hints.initial_state, None);

        // Short of the eight fields Xlib insists on
        let prop = RawProperty::from_u32s(AtomEnum::WM_HINTS.into(), &[WM_HINTS_STATE, 0, 3]);
        assert!(parse_wm_hints(&prop).is_none());
    }

    #[test]
    fn test_wm_hints_input() {
        let prop = RawProperty::from_u32s(
            AtomEnum::WM_HINTS.into(),
            &[WM_HINTS_INPUT, 0, 0, 0, 0, 0, 0, 0, 0],
        );
        assert_eq!(parse_wm_hints(&prop).unwrap().input, Some(false));

        let prop = RawProperty::from_u32s(
            AtomEnum::WM_HINTS.into(),
            &[WM_HINTS_INPUT, 1, 0, 0, 0, 0, 0, 0, 0],
        );
        assert_eq!(parse_wm_hints(&prop).unwrap().input, Some(true));

        // Input field is garbage without InputHint
        let prop = RawProperty::from_u32s(AtomEnum::WM_HINTS.into(), &[0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(parse_wm_hints(&prop).unwrap().input, None);
    }

    #[test]
    fn test_transient_for() {
        let prop = RawProperty::from_u32s(AtomEnum::WINDOW.into(), &[0x400001]);
        assert_eq!(parse_transient_for(&prop), Some(0x400001));

        let prop = RawProperty::from_u32s(AtomEnum::WINDOW.into(), &[0]);
        assert_eq!(parse_transient_for(&prop), None);
        assert_eq!(parse_transient_for(&RawProperty::absent()), None);
    }

    #[test]
    fn test_wm_state() {
        let prop = RawProperty::from_u32s(77, &[3, 0]);
        assert_eq!(parse_wm_state(&prop, 77), Some(WmState::Iconic));
        assert_eq!(parse_wm_state(&prop, 78), None);
        let prop = RawProperty::from_u32s(77, &[2, 0]);
        assert_eq!(parse_wm_state(&prop, 77), None);
    }

    #[test]
    fn test_mwm_absent_is_no_opinion() {
        assert_eq!(
            parse_mwm_hints(&RawProperty::absent(), MWM),
            Ok(DecorationHint::NoOpinion)
        );
    }

    #[test]
    fn test_mwm_border_cleared() {
        let decor = MWM_DECOR_TITLE;
        let prop = RawProperty::from_u32s(MWM, &[MWM_HINTS_DECORATIONS, 0, decor, 0, 0]);
        let hint = parse_mwm_hints(&prop, MWM).unwrap();
        assert_eq!(hint, DecorationHint::Restrict(Decorations::TITLE));
        let resolved = hint.resolve();
        assert!(resolved.contains(Decorations::TITLE));
        assert!(!resolved.contains(Decorations::BORDER));
    }

    #[test]
    fn test_mwm_decor_all_or_no_flag_is_no_opinion() {
        let prop = RawProperty::from_u32s(MWM, &[MWM_HINTS_DECORATIONS, 0, MWM_DECOR_ALL, 0, 0]);
        assert_eq!(parse_mwm_hints(&prop, MWM), Ok(DecorationHint::NoOpinion));

        // Decorations field present but not flagged as meaningful
        let prop = RawProperty::from_u32s(MWM, &[1, 0, 0, 0, 0]);
        assert_eq!(parse_mwm_hints(&prop, MWM), Ok(DecorationHint::NoOpinion));
    }

    #[test]
    fn test_mwm_malformed() {
        let prop = RawProperty {
            type_: MWM,
            format: 8,
            items: None,
        };
        assert_eq!(parse_mwm_hints(&prop, MWM), Err(MwmHintsDefect::WrongFormat(8)));

        let prop = RawProperty::from_u32s(31, &[MWM_HINTS_DECORATIONS, 0, 0, 0, 0]);
        assert_eq!(parse_mwm_hints(&prop, MWM), Err(MwmHintsDefect::WrongType));

        let prop = RawProperty::from_u32s(MWM, &[MWM_HINTS_DECORATIONS, 0, 0]);
        assert_eq!(parse_mwm_hints(&prop, MWM), Err(MwmHintsDefect::TooShort(3)));
    }

    #[test]
    fn test_default_decorations_are_full() {
        assert_eq!(DecorationHint::NoOpinion.resolve(), Decorations::TITLE | Decorations::BORDER);
    }
}
