//! Image toggle
//!
//! A boolean switch drawn with one of four images, picked by a lookup table
//! from its (checked × focused) state. Click, Space and Enter flip it.

use std::sync::Arc;

use gpui::*;
use tracing::debug;

use super::colors::FormColors;
use crate::error::ResultExt;
use crate::preview::decode_render_image;

/// Visual state of the toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleState {
    Unchecked,
    UncheckedFocused,
    Checked,
    CheckedFocused,
}

/// Embedded image for one toggle state
#[derive(Debug)]
pub struct ToggleAsset {
    pub name: &'static str,
    pub bytes: &'static [u8],
}

static TOGGLE_ASSETS: [ToggleAsset; 4] = [
    ToggleAsset {
        name: "unchecked",
        bytes: include_bytes!("../../assets/toggle/unchecked.png"),
    },
    ToggleAsset {
        name: "unchecked_focused",
        bytes: include_bytes!("../../assets/toggle/unchecked_focused.png"),
    },
    ToggleAsset {
        name: "checked",
        bytes: include_bytes!("../../assets/toggle/checked.png"),
    },
    ToggleAsset {
        name: "checked_focused",
        bytes: include_bytes!("../../assets/toggle/checked_focused.png"),
    },
];

impl ToggleState {
    pub const ALL: [ToggleState; 4] = [
        Self::Unchecked,
        Self::UncheckedFocused,
        Self::Checked,
        Self::CheckedFocused,
    ];

    pub fn new(checked: bool, focused: bool) -> Self {
        match (checked, focused) {
            (false, false) => Self::Unchecked,
            (false, true) => Self::UncheckedFocused,
            (true, false) => Self::Checked,
            (true, true) => Self::CheckedFocused,
        }
    }

    pub fn is_checked(self) -> bool {
        matches!(self, Self::Checked | Self::CheckedFocused)
    }

    pub fn is_focused(self) -> bool {
        matches!(self, Self::UncheckedFocused | Self::CheckedFocused)
    }

    /// Flip checked, keep focus
    pub fn toggled(self) -> Self {
        Self::new(!self.is_checked(), self.is_focused())
    }

    pub fn with_focus(self, focused: bool) -> Self {
        Self::new(self.is_checked(), focused)
    }

    fn index(self) -> usize {
        match self {
            Self::Unchecked => 0,
            Self::UncheckedFocused => 1,
            Self::Checked => 2,
            Self::CheckedFocused => 3,
        }
    }

    pub fn asset(self) -> &'static ToggleAsset {
        &TOGGLE_ASSETS[self.index()]
    }
}

/// Keys that flip a focused toggle
pub fn is_toggle_key(key: &str) -> bool {
    matches!(key, "space" | " " | "enter")
}

/// Decoded images, indexed like [`ToggleState::asset`]
type ToggleImages = [Option<Arc<RenderImage>>; 4];

fn decode_assets() -> ToggleImages {
    ToggleState::ALL.map(|state| {
        let asset = state.asset();
        debug!(asset = asset.name, "Decoding toggle image");
        // Embedded, so a failure is a packaging bug
        decode_render_image(asset.bytes).log_err()
    })
}

pub struct ImageToggle {
    checked: bool,
    images: ToggleImages,
    colors: FormColors,
    focus_handle: FocusHandle,
}

impl ImageToggle {
    pub fn new(checked: bool, colors: FormColors, cx: &mut App) -> Self {
        Self {
            checked,
            images: decode_assets(),
            colors,
            focus_handle: cx.focus_handle(),
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn get_focus_handle(&self) -> FocusHandle {
        self.focus_handle.clone()
    }

    pub fn toggle(&mut self, cx: &mut Context<Self>) {
        self.checked = !self.checked;
        cx.notify();
    }
}

impl Focusable for ImageToggle {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for ImageToggle {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let state = ToggleState::new(self.checked, self.focus_handle.is_focused(window));
        let colors = self.colors;

        let handle_click = cx.listener(
            |this: &mut Self, _event: &ClickEvent, window: &mut Window, cx: &mut Context<Self>| {
                this.focus_handle.focus(window, cx);
                this.toggle(cx);
            },
        );

        let face = match self.images[state.index()].clone() {
            Some(image) => img(move |_window: &mut Window, _cx: &mut App| Some(Ok(image.clone())))
                .size_full()
                .object_fit(ObjectFit::Contain)
                .into_any_element(),
            // Plain box if the embedded image could not be decoded
            None => div()
                .size_full()
                .rounded(px(8.))
                .bg(rgb(if state.is_checked() {
                    colors.border_focused
                } else {
                    colors.field
                }))
                .border_2()
                .border_color(rgb(colors.border_for(state.is_focused())))
                .into_any_element(),
        };

        div()
            .id("more-toggle")
            .track_focus(&self.focus_handle)
            .on_click(handle_click)
            .size(px(64.))
            .cursor_pointer()
            .child(face)
    }
}
