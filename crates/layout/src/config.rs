use quire_types::Size;
use serde::{Deserialize, Serialize};

/// Whether the header banner is drawn on the first page only or on every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderRepeat {
    #[default]
    FirstPageOnly,
    EveryPage,
}

/// Whether the footer is drawn on the last page only or on every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FooterRepeat {
    LastPageOnly,
    #[default]
    EveryPage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagePolicy {
    pub header: HeaderRepeat,
    pub footer: FooterRepeat,
}

impl PagePolicy {
    pub fn header_on(&self, page_index: usize) -> bool {
        page_index == 0 || self.header == HeaderRepeat::EveryPage
    }

    pub fn footer_on(&self, is_last: bool) -> bool {
        is_last || self.footer == FooterRepeat::EveryPage
    }
}

/// Fixed page geometry in points.
///
/// The content box is the page minus its margins. Header and footer
/// reservations and the bottom safety margin are carved out of it per page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub size: Size,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Vertical space between consecutive blocks.
    pub block_gap: f32,
    /// Space between the header banner and the first block, and between the
    /// last block and the footer.
    pub chrome_gap: f32,
    /// Always kept free at the bottom of the content box; the page-number
    /// annotation lives there.
    pub bottom_safety_margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: Size::a4(),
            margin_top: 40.0,
            margin_bottom: 40.0,
            margin_left: 45.0,
            margin_right: 45.0,
            block_gap: 10.0,
            chrome_gap: 12.0,
            bottom_safety_margin: 16.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        (self.size.width - self.margin_left - self.margin_right).max(0.0)
    }

    pub fn content_height(&self) -> f32 {
        (self.size.height - self.margin_top - self.margin_bottom).max(0.0)
    }
}
