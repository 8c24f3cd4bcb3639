//! Display Module
//!
//! The narrow set of display-server requests the adoption protocol performs,
//! behind the [`DisplayServer`] trait, plus its x11rb implementation.
//!
//! Requests are queued, not flushed; callers decide when to `sync`.

use std::sync::Arc;
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::shared::Geometry;
use crate::wm::atoms::Atoms;
use crate::wm::error::{DisplayError, DisplayResult};

/// A property as the server returned it
///
/// An absent property has `type_ == NONE` and `format == 0`. Only 32-bit
/// properties carry items; the hints we read are all CARD32 lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProperty {
    pub type_: Atom,
    pub format: u8,
    pub items: Option<Vec<u32>>,
}

impl RawProperty {
    pub fn absent() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_u32s(type_: Atom, data: &[u32]) -> Self {
        Self {
            type_,
            format: 32,
            items: Some(data.to_vec()),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.type_ == x11rb::NONE
    }

    /// CARD32 items; `None` unless the format is 32
    pub fn value32(&self) -> Option<&[u32]> {
        self.items.as_deref()
    }
}

/// Attributes and geometry of a window, read in one go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub geometry: Geometry,
    pub border_width: u32,
    pub colormap: Colormap,
    pub viewable: bool,
    pub override_redirect: bool,
}

/// Everything needed to create a frame window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    /// Outer position of the frame, border included
    pub x: i16,
    pub y: i16,
    /// Interior size: application window plus title bar
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    pub background: u32,
    pub border_color: u32,
    pub event_mask: EventMask,
    /// Keep the server from redirecting map/configure of the frame back to us
    pub override_redirect: bool,
}

/// A partial reconfiguration; `None` fields are left as they are
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowChanges {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_width: Option<u32>,
    pub sibling: Option<Window>,
    pub stack_mode: Option<StackMode>,
}

impl WindowChanges {
    /// Exactly what a ConfigureRequest asked for
    pub fn from_request(event: &ConfigureRequestEvent) -> Self {
        let mask = u16::from(event.value_mask);
        let has = |bit: ConfigWindow| mask & u16::from(bit) != 0;
        Self {
            x: has(ConfigWindow::X).then_some(event.x as i32),
            y: has(ConfigWindow::Y).then_some(event.y as i32),
            width: has(ConfigWindow::WIDTH).then_some(event.width as u32),
            height: has(ConfigWindow::HEIGHT).then_some(event.height as u32),
            border_width: has(ConfigWindow::BORDER_WIDTH).then_some(event.border_width as u32),
            sibling: has(ConfigWindow::SIBLING).then_some(event.sibling),
            stack_mode: has(ConfigWindow::STACK_MODE).then_some(event.stack_mode),
        }
    }

    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            width: Some(geometry.width),
            height: Some(geometry.height),
            ..Default::default()
        }
    }
}

/// Display-server requests used by the window manager core
pub trait DisplayServer {
    fn atoms(&self) -> &Atoms;

    fn root(&self) -> Window;

    /// Defer other clients' requests until [`ungrab_server`](Self::ungrab_server)
    fn grab_server(&self) -> DisplayResult<()>;

    fn ungrab_server(&self) -> DisplayResult<()>;

    /// Flush and wait until the server has processed everything sent so far
    fn sync(&self) -> DisplayResult<()>;

    fn window_attributes(&self, window: Window) -> DisplayResult<WindowSnapshot>;

    fn get_property(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        long_length: u32,
    ) -> DisplayResult<RawProperty>;

    fn change_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> DisplayResult<()>;

    /// Pointer position relative to the root window
    fn pointer_position(&self) -> DisplayResult<(i32, i32)>;

    /// Create a frame as a child of the root and return its id
    fn create_frame(&self, spec: &FrameSpec) -> DisplayResult<Window>;

    fn add_to_save_set(&self, window: Window) -> DisplayResult<()>;

    fn remove_from_save_set(&self, window: Window) -> DisplayResult<()>;

    fn select_input(&self, window: Window, mask: EventMask) -> DisplayResult<()>;

    fn set_border_width(&self, window: Window, width: u32) -> DisplayResult<()>;

    fn resize_window(&self, window: Window, width: u32, height: u32) -> DisplayResult<()>;

    fn configure_window(&self, window: Window, changes: &WindowChanges) -> DisplayResult<()>;

    fn reparent_window(&self, window: Window, parent: Window, x: i16, y: i16) -> DisplayResult<()>;

    /// Tell the application where it really is (ICCCM 4.1.5)
    fn send_configure_notify(&self, window: Window, geometry: Geometry) -> DisplayResult<()>;

    fn map_window(&self, window: Window) -> DisplayResult<()>;

    /// Raise to the top of the stack, then map
    fn map_raised(&self, window: Window) -> DisplayResult<()>;

    fn unmap_window(&self, window: Window) -> DisplayResult<()>;

    fn destroy_window(&self, window: Window) -> DisplayResult<()>;

    /// Children of the root, bottom to top
    fn query_children(&self) -> DisplayResult<Vec<Window>>;
}

/// [`DisplayServer`] over an x11rb connection
pub struct X11Display {
    conn: Arc<RustConnection>,
    root: Window,
    depth: u8,
    atoms: Atoms,
}

impl X11Display {
    pub fn new(conn: Arc<RustConnection>, screen_num: usize, atoms: Atoms) -> Self {
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let depth = screen.root_depth;
        Self {
            conn,
            root,
            depth,
            atoms,
        }
    }

    pub fn connection(&self) -> &RustConnection {
        self.conn.as_ref()
    }
}

impl DisplayServer for X11Display {
    fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    fn root(&self) -> Window {
        self.root
    }

    fn grab_server(&self) -> DisplayResult<()> {
        self.conn.grab_server()?;
        Ok(())
    }

    fn ungrab_server(&self) -> DisplayResult<()> {
        self.conn.ungrab_server()?;
        Ok(())
    }

    fn sync(&self) -> DisplayResult<()> {
        // Any round trip will do; this is what XSync does
        self.conn.get_input_focus()?.reply()?;
        Ok(())
    }

    fn window_attributes(&self, window: Window) -> DisplayResult<WindowSnapshot> {
        let attrs_cookie = self.conn.get_window_attributes(window)?;
        let geom_cookie = self.conn.get_geometry(window)?;
        let attrs = attrs_cookie.reply()?;
        let geom = geom_cookie.reply()?;

        Ok(WindowSnapshot {
            geometry: Geometry::new(
                geom.x as i32,
                geom.y as i32,
                geom.width as u32,
                geom.height as u32,
            ),
            border_width: geom.border_width as u32,
            colormap: attrs.colormap,
            viewable: attrs.map_state == MapState::VIEWABLE,
            override_redirect: attrs.override_redirect,
        })
    }

    fn get_property(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        long_length: u32,
    ) -> DisplayResult<RawProperty> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, long_length)?
            .reply()?;
        Ok(RawProperty {
            type_: reply.type_,
            format: reply.format,
            items: reply.value32().map(|items| items.collect()),
        })
    }

    fn change_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> DisplayResult<()> {
        self.conn
            .change_property32(PropMode::REPLACE, window, property, type_, data)?;
        Ok(())
    }

    fn pointer_position(&self) -> DisplayResult<(i32, i32)> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;
        if !reply.same_screen {
            return Err(DisplayError::Request {
                request: "QueryPointer",
                window: self.root,
            });
        }
        Ok((reply.root_x as i32, reply.root_y as i32))
    }

    fn create_frame(&self, spec: &FrameSpec) -> DisplayResult<Window> {
        let frame = self.conn.generate_id()?;
        self.conn.create_window(
            self.depth,
            frame,
            self.root,
            spec.x,
            spec.y,
            spec.width,
            spec.height,
            spec.border_width,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new()
                .override_redirect(u32::from(spec.override_redirect))
                .background_pixel(spec.background)
                .border_pixel(spec.border_color)
                .event_mask(spec.event_mask),
        )?;
        debug!("Created frame 0x{:x} at {},{} {}x{}", frame, spec.x, spec.y, spec.width, spec.height);
        Ok(frame)
    }

    fn add_to_save_set(&self, window: Window) -> DisplayResult<()> {
        self.conn.change_save_set(SetMode::INSERT, window)?;
        Ok(())
    }

    fn remove_from_save_set(&self, window: Window) -> DisplayResult<()> {
        self.conn.change_save_set(SetMode::DELETE, window)?;
        Ok(())
    }

    fn select_input(&self, window: Window, mask: EventMask) -> DisplayResult<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(mask),
        )?;
        Ok(())
    }

    fn set_border_width(&self, window: Window, width: u32) -> DisplayResult<()> {
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().border_width(width))?;
        Ok(())
    }

    fn resize_window(&self, window: Window, width: u32, height: u32) -> DisplayResult<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().width(width).height(height),
        )?;
        Ok(())
    }

    fn configure_window(&self, window: Window, changes: &WindowChanges) -> DisplayResult<()> {
        let aux = ConfigureWindowAux::new()
            .x(changes.x)
            .y(changes.y)
            .width(changes.width)
            .height(changes.height)
            .border_width(changes.border_width)
            .sibling(changes.sibling)
            .stack_mode(changes.stack_mode);
        self.conn.configure_window(window, &aux)?;
        Ok(())
    }

    fn reparent_window(&self, window: Window, parent: Window, x: i16, y: i16) -> DisplayResult<()> {
        self.conn.reparent_window(window, parent, x, y)?;
        Ok(())
    }

    fn send_configure_notify(&self, window: Window, geometry: Geometry) -> DisplayResult<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: x11rb::NONE,
            x: clamp_i16(geometry.x),
            y: clamp_i16(geometry.y),
            width: clamp_u16(geometry.width),
            height: clamp_u16(geometry.height),
            border_width: 0,
            override_redirect: false,
        };
        self.conn
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    fn map_window(&self, window: Window) -> DisplayResult<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn map_raised(&self, window: Window) -> DisplayResult<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        self.conn.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> DisplayResult<()> {
        self.conn.unmap_window(window)?;
        Ok(())
    }

    fn destroy_window(&self, window: Window) -> DisplayResult<()> {
        self.conn.destroy_window(window)?;
        Ok(())
    }

    fn query_children(&self) -> DisplayResult<Vec<Window>> {
        Ok(self.conn.query_tree(self.root)?.reply()?.children)
    }
}

/// Saturate into the 16-bit coordinate space of the core protocol
pub fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

pub fn clamp_u16(value: u32) -> u16 {
    value.min(u16::MAX as u32) as u16
}
