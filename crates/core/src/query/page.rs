/// Row window for a frame.
///
/// The common case is a "show more" prefix (`index == 0`, growing `size`);
/// offset paging moves `index` instead. Either way the window starts at
/// `index * size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub size: usize,
    pub index: usize,
}

impl Page {
    /// First `size` rows.
    #[must_use]
    pub fn prefix(size: usize) -> Self {
        Self { size, index: 0 }
    }

    /// Rows `index * size .. (index + 1) * size`.
    #[must_use]
    pub fn offset(size: usize, index: usize) -> Self {
        Self { size, index }
    }

    /// Every row.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::prefix(usize::MAX)
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.index.saturating_mul(self.size)
    }

    /// Grow a prefix window by `step` rows, back on the first page.
    pub fn show_more(&mut self, step: usize) {
        self.size = self.size.saturating_add(step);
        self.index = 0;
    }

    pub fn next(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Keep the window within `matched` rows, e.g. after a filter shrank them.
    #[must_use]
    pub fn clamped_to(self, matched: usize) -> Self {
        if self.size == 0 || self.start() < matched || self.index == 0 {
            return self;
        }
        let last = matched.saturating_sub(1) / self.size;
        Self {
            size: self.size,
            index: last,
        }
    }

    /// The rows of `items` inside this window.
    #[must_use]
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.start())
            .take(self.size)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::unbounded()
    }
}
