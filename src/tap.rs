/// Tap/click mapping for the booster screen.
///
/// The render pass records which terminal rows trigger which action key; the
/// mouse handler converts a pixel position into a row and looks it up here.
/// DOM access stays in `main.rs` so everything in this module is testable.

/// A run of terminal rows `[top, bottom)` bound to one action key.
#[derive(Debug, Clone, PartialEq)]
pub struct TapRegion {
    pub top: u16,
    pub bottom: u16,
    pub action: char,
}

/// Regions recorded during the last frame plus the terminal size they refer to.
#[derive(Debug, Default)]
pub struct TapMap {
    pub regions: Vec<TapRegion>,
    pub cols: u16,
    pub rows: u16,
}

impl TapMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: remember the terminal size and drop stale regions.
    pub fn reset(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.regions.clear();
    }

    pub fn bind_row(&mut self, row: u16, action: char) {
        self.bind_rows(row, 1, action);
    }

    pub fn bind_rows(&mut self, top: u16, height: u16, action: char) {
        if height == 0 {
            return;
        }
        self.regions.push(TapRegion {
            top,
            bottom: top.saturating_add(height),
            action,
        });
    }

    /// Action bound to `row`. Later bindings sit on top of earlier ones.
    pub fn action_at(&self, row: u16) -> Option<char> {
        self.regions
            .iter()
            .rev()
            .find(|r| r.top <= row && row < r.bottom)
            .map(|r| r.action)
    }

    pub fn is_ready(&self) -> bool {
        self.cols > 0 && self.rows > 0
    }
}

/// Convert a y offset (px, relative to the grid's top edge) into a row index.
/// `None` when the offset falls outside the grid.
pub fn pixel_y_to_row(offset_y: f64, grid_height: f64, rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || rows == 0 || offset_y < 0.0 {
        return None;
    }
    let row = (offset_y / (grid_height / rows as f64)) as u16;
    (row < rows).then_some(row)
}

/// Phones and split windows get the single-column layout.
pub fn is_compact_layout(width: u16) -> bool {
    width < 64
}
