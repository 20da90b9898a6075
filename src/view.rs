//! Gallery view state: active filter, focused viewer, and stale-result guard.
//!
//! Owned by a single view instance. The filtered list is always derived from
//! the base sequence so filtering never reorders photos.

use crate::types::*;

#[derive(Debug, Default)]
pub struct GalleryView {
    images: Vec<ImageDescriptor>,
    filter: CategoryFilter,
    /// Index into the filtered list while the focused viewer is open
    focused: Option<usize>,
}

impl GalleryView {
    pub fn new(filter: CategoryFilter) -> Self {
        Self {
            images: Vec::new(),
            filter,
            focused: None,
        }
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    pub fn set_images(&mut self, images: Vec<ImageDescriptor>) {
        self.images = images;
        self.reconcile_focus();
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
        self.reconcile_focus();
    }

    /// Photos matching the active filter, in base order
    pub fn filtered(&self) -> Vec<&ImageDescriptor> {
        self.images
            .iter()
            .filter(|d| self.filter.matches(d.category))
            .collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.images
            .iter()
            .filter(|d| self.filter.matches(d.category))
            .count()
    }

    pub fn is_empty_for_filter(&self) -> bool {
        self.filtered_len() == 0
    }

    pub fn open_at(&mut self, index: usize) -> bool {
        if index < self.filtered_len() {
            self.focused = Some(index);
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.focused = None;
    }

    pub fn is_open(&self) -> bool {
        self.focused.is_some()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused
    }

    pub fn current(&self) -> Option<&ImageDescriptor> {
        let i = self.focused?;
        self.filtered().get(i).copied()
    }

    pub fn next(&mut self) {
        let len = self.filtered_len();
        if let Some(i) = self.focused {
            if len > 0 {
                self.focused = Some((i + 1) % len);
            }
        }
    }

    pub fn prev(&mut self) {
        let len = self.filtered_len();
        if let Some(i) = self.focused {
            if len > 0 {
                self.focused = Some((i + len - 1) % len);
            }
        }
    }

    /// Photo after the focused one, worth preloading
    pub fn peek_next(&self) -> Option<&ImageDescriptor> {
        let i = self.focused?;
        let filtered = self.filtered();
        if filtered.len() > 1 {
            filtered.get((i + 1) % filtered.len()).copied()
        } else {
            None
        }
    }

    fn reconcile_focus(&mut self) {
        let len = self.filtered_len();
        if let Some(i) = self.focused {
            if len == 0 {
                self.focused = None;
            } else if i >= len {
                self.focused = Some(0);
            }
        }
    }
}

/// Ticket for one resolution pass. Results carrying an older ticket, or
/// arriving after teardown, are dropped. The current ticket is honored once.
#[derive(Debug, Default)]
pub struct ResolveGeneration {
    current: u64,
    applied: bool,
    torn_down: bool,
}

impl ResolveGeneration {
    /// Start a new pass, invalidating every earlier one
    pub fn begin(&mut self) -> u64 {
        self.current += 1;
        self.applied = false;
        self.torn_down = false;
        self.current
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn tear_down(&mut self) {
        self.torn_down = true;
    }

    /// Claim the result for `generation`. True only for the first delivery
    /// of the current pass.
    pub fn accept(&mut self, generation: u64) -> bool {
        if self.torn_down || self.applied || generation != self.current {
            return false;
        }
        self.applied = true;
        true
    }
}
