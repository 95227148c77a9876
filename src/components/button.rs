//! Confirm button for the popup form

use gpui::*;
use std::rc::Rc;

use super::colors::FormColors;

/// Callback type for button click events
pub type OnClickCallback = Box<dyn Fn(&ClickEvent, &mut Window, &mut App) + 'static>;

/// A filled button with an optional keyboard hint
///
/// # Example
/// ```ignore
/// Button::new("OK", colors)
///     .shortcut("↵")
///     .on_click(Box::new(|_, _, _| confirm()))
/// ```
#[derive(IntoElement)]
pub struct Button {
    label: SharedString,
    colors: FormColors,
    shortcut: Option<SharedString>,
    on_click: Option<Rc<OnClickCallback>>,
}

impl Button {
    pub fn new(label: impl Into<SharedString>, colors: FormColors) -> Self {
        Self {
            label: label.into(),
            colors,
            shortcut: None,
            on_click: None,
        }
    }

    /// Set the keyboard shortcut display text
    pub fn shortcut(mut self, shortcut: impl Into<SharedString>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn on_click(mut self, callback: OnClickCallback) -> Self {
        self.on_click = Some(Rc::new(callback));
        self
    }
}

impl RenderOnce for Button {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let colors = self.colors;

        let mut button = div()
            .id(ElementId::Name(self.label.clone()))
            .flex()
            .flex_row()
            .items_center()
            .justify_center()
            .gap(px(8.))
            .w(px(220.))
            .h(px(72.))
            .rounded(px(8.))
            .bg(rgb(colors.field))
            .border_2()
            .border_color(rgb(colors.border_focused))
            .text_color(rgb(colors.text))
            .text_xl()
            .font_weight(FontWeight::BOLD)
            .cursor_pointer()
            .hover(move |s| {
                s.bg(rgb(colors.border_focused))
                    .text_color(rgb(colors.background))
            })
            .child(self.label);

        if let Some(shortcut) = self.shortcut {
            button = button.child(div().text_sm().opacity(0.7).child(shortcut));
        }

        if let Some(callback) = self.on_click {
            button = button.on_click(move |event, window, cx| {
                callback(event, window, cx);
            });
        }

        button
    }
}
