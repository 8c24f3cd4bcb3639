//! In-memory display server and collaborators for unit tests

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use x11rb::protocol::xproto::{Atom, Colormap, EventMask, Window};

use crate::config::DecorationConfig;
use crate::shared::Geometry;
use crate::wm::atoms::Atoms;
use crate::wm::client::Client;
use crate::wm::display::{DisplayServer, FrameSpec, RawProperty, WindowChanges, WindowSnapshot};
use crate::wm::error::{DisplayError, DisplayResult};
use crate::wm::hooks::Collaborators;
use crate::wm::registry::ClientRegistry;

pub const ROOT: Window = 0x1;
const FIRST_FRAME: Window = 0x10000;

/// A request as the fake server saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    GrabServer,
    UngrabServer,
    Sync,
    ChangeProperty(Window, Atom, Vec<u32>),
    CreateFrame(FrameSpec),
    AddToSaveSet(Window),
    RemoveFromSaveSet(Window),
    SelectInput(Window, EventMask),
    SetBorderWidth(Window, u32),
    Resize(Window, u32, u32),
    Configure(Window, WindowChanges),
    Reparent(Window, Window, i16, i16),
    ConfigureNotify(Window, Geometry),
    Map(Window),
    MapRaised(Window),
    Unmap(Window),
    Destroy(Window),
}

#[derive(Debug, Clone, Copy)]
pub struct FakeWindow {
    pub geometry: Geometry,
    pub border_width: u32,
    pub colormap: Colormap,
    pub viewable: bool,
    pub override_redirect: bool,
}

impl FakeWindow {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            geometry: Geometry::new(x, y, width, height),
            border_width: 0,
            colormap: 0x20,
            viewable: false,
            override_redirect: false,
        }
    }

    pub fn viewable(mut self) -> Self {
        self.viewable = true;
        self
    }

    pub fn border(mut self, width: u32) -> Self {
        self.border_width = width;
        self
    }

    pub fn override_redirect(mut self) -> Self {
        self.override_redirect = true;
        self
    }
}

pub struct FakeDisplay {
    atoms: Atoms,
    windows: RefCell<BTreeMap<Window, FakeWindow>>,
    properties: RefCell<BTreeMap<(Window, Atom), RawProperty>>,
    pointer: Cell<Option<(i32, i32)>>,
    pointer_queries: Cell<u32>,
    fail_frame: Cell<bool>,
    fail_raise: Cell<bool>,
    next_frame: Cell<Window>,
    requests: RefCell<Vec<Request>>,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self {
            atoms: Atoms {
                wm_state: 400,
                motif_wm_hints: 401,
                net_wm_name: 402,
                utf8_string: 403,
            },
            windows: RefCell::new(BTreeMap::new()),
            properties: RefCell::new(BTreeMap::new()),
            pointer: Cell::new(Some((0, 0))),
            pointer_queries: Cell::new(0),
            fail_frame: Cell::new(false),
            fail_raise: Cell::new(false),
            next_frame: Cell::new(FIRST_FRAME),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn add_window(&self, window: Window, fake: FakeWindow) {
        self.windows.borrow_mut().insert(window, fake);
    }

    pub fn set_property(&self, window: Window, property: Atom, value: RawProperty) {
        self.properties.borrow_mut().insert((window, property), value);
    }

    pub fn set_pointer(&self, x: i32, y: i32) {
        self.pointer.set(Some((x, y)));
    }

    pub fn fail_pointer(&self) {
        self.pointer.set(None);
    }

    pub fn fail_frame_creation(&self) {
        self.fail_frame.set(true);
    }

    pub fn fail_map_raised(&self) {
        self.fail_raise.set(true);
    }

    pub fn pointer_queries(&self) -> u32 {
        self.pointer_queries.get()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    /// Current `WM_STATE` contents, as CARD32s
    pub fn wm_state_of(&self, window: Window) -> Option<Vec<u32>> {
        self.properties
            .borrow()
            .get(&(window, self.atoms.wm_state))
            .and_then(|prop| prop.value32().map(<[u32]>::to_vec))
    }

    fn record(&self, request: Request) -> DisplayResult<()> {
        self.requests.borrow_mut().push(request);
        Ok(())
    }
}

impl DisplayServer for FakeDisplay {
    fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    fn root(&self) -> Window {
        ROOT
    }

    fn grab_server(&self) -> DisplayResult<()> {
        self.record(Request::GrabServer)
    }

    fn ungrab_server(&self) -> DisplayResult<()> {
        self.record(Request::UngrabServer)
    }

    fn sync(&self) -> DisplayResult<()> {
        self.record(Request::Sync)
    }

    fn window_attributes(&self, window: Window) -> DisplayResult<WindowSnapshot> {
        let fake = self
            .windows
            .borrow()
            .get(&window)
            .copied()
            .ok_or(DisplayError::Request {
                request: "GetWindowAttributes",
                window,
            })?;
        Ok(WindowSnapshot {
            geometry: fake.geometry,
            border_width: fake.border_width,
            colormap: fake.colormap,
            viewable: fake.viewable,
            override_redirect: fake.override_redirect,
        })
    }

    fn get_property(
        &self,
        window: Window,
        property: Atom,
        _type: Atom,
        _long_length: u32,
    ) -> DisplayResult<RawProperty> {
        Ok(self
            .properties
            .borrow()
            .get(&(window, property))
            .cloned()
            .unwrap_or_default())
    }

    fn change_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> DisplayResult<()> {
        self.set_property(window, property, RawProperty::from_u32s(type_, data));
        self.record(Request::ChangeProperty(window, property, data.to_vec()))
    }

    fn pointer_position(&self) -> DisplayResult<(i32, i32)> {
        self.pointer_queries.set(self.pointer_queries.get() + 1);
        self.pointer.get().ok_or(DisplayError::Request {
            request: "QueryPointer",
            window: ROOT,
        })
    }

    fn create_frame(&self, spec: &FrameSpec) -> DisplayResult<Window> {
        if self.fail_frame.get() {
            return Err(DisplayError::Request {
                request: "CreateWindow",
                window: ROOT,
            });
        }
        let frame = self.next_frame.get();
        self.next_frame.set(frame + 1);
        self.record(Request::CreateFrame(*spec))?;
        Ok(frame)
    }

    fn add_to_save_set(&self, window: Window) -> DisplayResult<()> {
        self.record(Request::AddToSaveSet(window))
    }

    fn remove_from_save_set(&self, window: Window) -> DisplayResult<()> {
        self.record(Request::RemoveFromSaveSet(window))
    }

    fn select_input(&self, window: Window, mask: EventMask) -> DisplayResult<()> {
        self.record(Request::SelectInput(window, mask))
    }

    fn set_border_width(&self, window: Window, width: u32) -> DisplayResult<()> {
        self.record(Request::SetBorderWidth(window, width))
    }

    fn resize_window(&self, window: Window, width: u32, height: u32) -> DisplayResult<()> {
        self.record(Request::Resize(window, width, height))
    }

    fn configure_window(&self, window: Window, changes: &WindowChanges) -> DisplayResult<()> {
        self.record(Request::Configure(window, *changes))
    }

    fn reparent_window(&self, window: Window, parent: Window, x: i16, y: i16) -> DisplayResult<()> {
        self.record(Request::Reparent(window, parent, x, y))
    }

    fn send_configure_notify(&self, window: Window, geometry: Geometry) -> DisplayResult<()> {
        self.record(Request::ConfigureNotify(window, geometry))
    }

    fn map_window(&self, window: Window) -> DisplayResult<()> {
        if let Some(fake) = self.windows.borrow_mut().get_mut(&window) {
            fake.viewable = true;
        }
        self.record(Request::Map(window))
    }

    fn map_raised(&self, window: Window) -> DisplayResult<()> {
        if self.fail_raise.get() {
            return Err(DisplayError::Request {
                request: "MapWindow",
                window,
            });
        }
        self.record(Request::MapRaised(window))
    }

    fn unmap_window(&self, window: Window) -> DisplayResult<()> {
        if let Some(fake) = self.windows.borrow_mut().get_mut(&window) {
            fake.viewable = false;
        }
        self.record(Request::Unmap(window))
    }

    fn destroy_window(&self, window: Window) -> DisplayResult<()> {
        self.record(Request::Destroy(window))
    }

    fn query_children(&self) -> DisplayResult<Vec<Window>> {
        Ok(self.windows.borrow().keys().copied().collect())
    }
}

/// Remembers which collaborator was asked to do what, by window
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub titles: Vec<Window>,
    pub shaped: Vec<Window>,
    pub focused: Vec<Window>,
    /// Focused clients whose WM_HINTS refuse input
    pub passive: Vec<Window>,
    pub taskbar_redraws: u32,
}

impl Collaborators for RecordingHooks {
    fn update_title(&mut self, client: &mut Client) {
        client.title = format!("window 0x{:x}", client.window);
        self.titles.push(client.window);
    }

    fn set_shape(&mut self, client: &mut Client, _cfg: &DecorationConfig) {
        self.shaped.push(client.window);
    }

    fn apply_focus(&mut self, client: &Client) {
        self.focused.push(client.window);
        if !client.accepts_input {
            self.passive.push(client.window);
        }
    }

    fn redraw_taskbar(&mut self, _clients: &ClientRegistry) {
        self.taskbar_redraws += 1;
    }
}
