//! Left-button drag tracking for camera rotation

/// Turns cursor positions into drag deltas while the button is held
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    /// Last known cursor position in window pixels
    cursor: Option<(f64, f64)>,
    dragging: bool,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Button pressed; the drag starts at the current cursor position
    pub fn press(&mut self) {
        self.dragging = true;
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    /// Cursor left the window; the next move must not produce a jump
    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }

    /// Record a cursor position and return `(dx, dy)` since the previous one
    /// while dragging
    pub fn moved(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        let previous = self.cursor.replace((x, y));
        if !self.dragging {
            return None;
        }
        let (px, py) = previous?;
        let delta = ((x - px) as f32, (y - py) as f32);
        (delta != (0.0, 0.0)).then_some(delta)
    }
}
