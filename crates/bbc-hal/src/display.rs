//! Generic `Display` trait for the robot's character LCD.

/// A text display.
///
/// Rendering is best-effort: the core never inspects the outcome of a write,
/// so the methods are infallible.
pub trait Display {
    /// Blank the whole screen and home the cursor.
    fn clear(&mut self);

    /// Write `text` at the cursor.
    fn print(&mut self, text: &str);

    /// Write `text` starting at `row`, `col` (both zero-based).
    fn print_at(&mut self, row: u8, col: u8, text: &str);
}
