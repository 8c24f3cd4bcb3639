//! Geometry value types
//!
//! Plain data shared between the adoption protocol, the gravity resolver and
//! the display-server wrapper. Positions are root-relative.

/// Window geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Space a frame adds around the application window, per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameExtents {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl FrameExtents {
    pub fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> u32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let geom = Geometry::new(10, 20, 100, 50);
        assert_eq!(geom.right(), 110);
        assert_eq!(geom.bottom(), 70);
    }

    #[test]
    fn test_extent_sums() {
        let ext = FrameExtents { left: 2, right: 2, top: 22, bottom: 2 };
        assert_eq!(ext.horizontal(), 4);
        assert_eq!(ext.vertical(), 24);
    }
}
