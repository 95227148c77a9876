//! Popup form palette
//!
//! Pre-computed colors (Copy) so render closures can capture them without
//! holding a reference to anything.

/// Colors shared by the popup and its fields, as 0xRRGGBB
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormColors {
    /// Window background
    pub background: u32,
    /// Field and button fill
    pub field: u32,
    /// Label and input text
    pub text: u32,
    /// Placeholder text
    pub placeholder: u32,
    /// Border of unfocused fields
    pub border: u32,
    /// Border of the focused field, button text on hover
    pub border_focused: u32,
    /// Caret
    pub cursor: u32,
    /// Selected text background
    pub selection: u32,
}

impl Default for FormColors {
    fn default() -> Self {
        Self {
            background: 0x192a56,
            field: 0x233e70,
            text: 0xf5f6fa,
            placeholder: 0x8c9ab8,
            border: 0x0099cc,
            border_focused: 0xff9800,
            cursor: 0xff9800,
            selection: 0x0099cc,
        }
    }
}

impl FormColors {
    /// Border for a field in the given focus state
    pub fn border_for(&self, focused: bool) -> u32 {
        if focused {
            self.border_focused
        } else {
            self.border
        }
    }
}
