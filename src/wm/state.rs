//! Window manager state
//!
//! Everything the adoption protocol reads or mutates, owned in one place and
//! passed explicitly.

use x11rb::protocol::xproto::Window;

use crate::config::{Config, DecorationConfig, FeatureConfig, WindowColors};
use crate::shared::Geometry;
use crate::wm::client::Client;
use crate::wm::registry::ClientRegistry;

#[derive(Debug)]
pub struct WindowManagerState {
    pub clients: ClientRegistry,
    /// Client holding input focus
    pub focused: Option<Window>,
    /// Most recently mapped client
    pub topmost: Option<Window>,
    /// Root window area
    pub screen: Geometry,
    pub decorations: DecorationConfig,
    pub colors: WindowColors,
    /// Capabilities after checking what the server supports
    pub features: FeatureConfig,
}

impl WindowManagerState {
    pub fn new(config: &Config, screen: Geometry) -> Self {
        Self {
            clients: ClientRegistry::new(),
            focused: None,
            topmost: None,
            screen,
            decorations: config.decorations,
            colors: config.colors,
            features: config.features,
        }
    }

    pub fn focused_client(&self) -> Option<&Client> {
        self.focused.and_then(|w| self.clients.get(w))
    }
}
