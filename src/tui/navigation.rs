#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub selected_index: usize,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self, item_count: usize) {
        if self.selected_index < item_count.saturating_sub(1) {
            self.selected_index += 1;
        }
    }

    /// Keeps the selection inside the list after a snapshot changed its length.
    /// Scrolling is left to the list widget, which follows the selection.
    pub fn clamp(&mut self, item_count: usize) {
        self.selected_index = self.selected_index.min(item_count.saturating_sub(1));
    }
}
