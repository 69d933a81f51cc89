/// ANSI foreground colors used by the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Green = 32,
    Yellow = 33,
    Blue = 34,
    Cyan = 36,
    White = 37,
}

impl Color {
    /// Wraps `text` in this color, or returns it unchanged when `enabled` is false.
    pub fn paint(self, text: &str, enabled: bool) -> String {
        if enabled {
            format!("\x1b[{}m{text}\x1b[0m", self as u8)
        } else {
            text.to_string()
        }
    }
}
