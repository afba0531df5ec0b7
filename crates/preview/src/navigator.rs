/// Clamps a requested 1-based page into `[1, total]`. With no pages the
/// result is 1.
pub fn clamp_page(requested: usize, total: usize) -> usize {
    requested.clamp(1, total.max(1))
}

/// Current-page tracking for a preview. Never wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNavigator {
    current: usize,
    total: usize,
}

impl PageNavigator {
    pub fn new(total: usize) -> Self {
        Self { current: 1, total }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Updates the page count after a re-render, keeping the current page
    /// when it still exists.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.current = clamp_page(self.current, total);
    }

    pub fn go_to(&mut self, page: usize) -> usize {
        self.current = clamp_page(page, self.total);
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.current.saturating_add(1))
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.current.saturating_sub(1))
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }
}
