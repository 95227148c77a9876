//! Popup form components
//!
//! - [`TextField`] - Single-line input over a [`TextBuffer`]
//! - [`ImageToggle`] - Four-image boolean switch
//! - [`Button`] - Confirm button
//!
//! All components take pre-computed [`FormColors`] (Copy) so render closures
//! capture plain values.

pub mod button;
pub mod colors;
pub mod text_buffer;
pub mod text_field;
pub mod toggle;

pub use button::Button;
pub use colors::FormColors;
pub use text_buffer::{EditKey, TextBuffer};
pub use text_field::TextField;
pub use toggle::{is_toggle_key, ImageToggle, ToggleAsset, ToggleState};
