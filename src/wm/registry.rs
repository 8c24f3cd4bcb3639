//! Client Registry
//!
//! Flat, ordered list of managed clients. Insertion order until someone asks
//! for [`ClientRegistry::reorder_by_x_position`], which is what the taskbar
//! reads.

use x11rb::protocol::xproto::Window;

use crate::wm::client::Client;
use crate::wm::error::RegistryError;

#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Vec<Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail; a second client for the same window is refused
    pub fn push(&mut self, client: Client) -> Result<&mut Client, RegistryError> {
        if self.contains(client.window) {
            return Err(RegistryError::Duplicate(client.window));
        }
        let index = self.clients.len();
        self.clients.push(client);
        Ok(&mut self.clients[index])
    }

    pub fn contains(&self, window: Window) -> bool {
        self.clients.iter().any(|c| c.window == window)
    }

    pub fn get(&self, window: Window) -> Option<&Client> {
        self.clients.iter().find(|c| c.window == window)
    }

    pub fn get_mut(&mut self, window: Window) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.window == window)
    }

    pub fn remove(&mut self, window: Window) -> Option<Client> {
        let index = self.clients.iter().position(|c| c.window == window)?;
        Some(self.clients.remove(index))
    }

    /// The client `window` is a transient for, if that client is still managed
    pub fn transient_parent(&self, window: Window) -> Option<&Client> {
        let parent = self.get(window)?.transient_for?;
        self.get(parent)
    }

    /// Stable sort by the application window's x coordinate
    pub fn reorder_by_x_position(&mut self) {
        self.clients.sort_by_key(|c| c.x);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Client> {
        self.clients.iter()
    }

    pub fn windows(&self) -> Vec<Window> {
        self.clients.iter().map(|c| c.window).collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
