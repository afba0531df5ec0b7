use serde::{Deserialize, Serialize};

/// Page or image extent in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// ISO A4 portrait in points.
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// Pixel dimensions of this size rendered at `scale` pixels per point.
    pub fn scaled_pixels(&self, scale: f32) -> (u32, u32) {
        let w = (self.width * scale).ceil().max(1.0) as u32;
        let h = (self.height * scale).ceil().max(1.0) as u32;
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_pixels_rounds_up_and_never_collapses() {
        assert_eq!(Size::a4().scaled_pixels(2.0), (1190, 1684));
        assert_eq!(Size::new(10.2, 0.0).scaled_pixels(1.0), (11, 1));
    }
}
