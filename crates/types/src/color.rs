/// An opaque RGB color. Documents are printed, so there is no alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u8) -> Self {
        Self { r: value, g: value, b: value }
    }

    /// Components scaled to `0.0..=1.0`, the form PDF color operators expect.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_components_span_zero_to_one() {
        assert_eq!(Color::rgb(0, 0, 0).to_unit(), [0.0, 0.0, 0.0]);
        assert_eq!(Color::gray(255).to_unit(), [1.0, 1.0, 1.0]);
        let [r, g, b] = Color::rgb(0x33, 0x66, 0x99).to_unit();
        assert!((r - 0.2).abs() < 1e-6 && (g - 0.4).abs() < 1e-6 && (b - 0.6).abs() < 1e-6);
    }
}
