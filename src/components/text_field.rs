//! Single-line text field
//!
//! Renders a [`TextBuffer`] with caret, selection and placeholder. Key events
//! are forwarded by the owning view through [`TextField::handle_key_event`];
//! the field itself only tracks focus.

use gpui::*;

use super::colors::FormColors;
use super::text_buffer::{EditKey, TextBuffer};

pub struct TextField {
    id: SharedString,
    buffer: TextBuffer,
    placeholder: SharedString,
    colors: FormColors,
    /// Fixed width, None = fill the row
    width: Option<Pixels>,
    focus_handle: FocusHandle,
}

impl TextField {
    pub fn new(
        id: impl Into<SharedString>,
        initial: &str,
        placeholder: impl Into<SharedString>,
        max_chars: Option<usize>,
        colors: FormColors,
        cx: &mut App,
    ) -> Self {
        Self {
            id: id.into(),
            buffer: TextBuffer::new(initial, max_chars),
            placeholder: placeholder.into(),
            colors,
            width: None,
            focus_handle: cx.focus_handle(),
        }
    }

    pub fn with_width(mut self, width: Pixels) -> Self {
        self.width = Some(width);
        self
    }

    pub fn value(&self) -> &str {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Handle used by the owning view for Tab order and initial focus
    pub fn get_focus_handle(&self) -> FocusHandle {
        self.focus_handle.clone()
    }

    /// Decode and apply one keystroke, including clipboard commands
    pub fn handle_key_event(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) {
        let keystroke = &event.keystroke;
        let Some(edit) = EditKey::from_keystroke(
            &keystroke.key,
            keystroke.key_char.as_deref(),
            keystroke.modifiers.secondary(),
            keystroke.modifiers.shift,
        ) else {
            return;
        };

        match edit {
            EditKey::Copy => {
                let text = self.buffer.selected_text();
                if !text.is_empty() {
                    cx.write_to_clipboard(ClipboardItem::new_string(text.to_string()));
                }
                return;
            }
            EditKey::Cut => {
                let text = self.buffer.cut();
                if !text.is_empty() {
                    cx.write_to_clipboard(ClipboardItem::new_string(text));
                }
            }
            EditKey::Paste => {
                if let Some(text) = cx.read_from_clipboard().and_then(|item| item.text()) {
                    self.buffer.insert(&text);
                }
            }
            other => self.buffer.apply(&other),
        }
        cx.notify();
    }

    fn render_content(&self, is_focused: bool) -> Div {
        let colors = self.colors;
        let text = |s: &str| div().text_color(rgb(colors.text)).child(s.to_string());

        if self.buffer.is_empty() {
            return if is_focused {
                div().flex().items_center().child(caret(colors))
            } else {
                div()
                    .text_color(rgb(colors.placeholder))
                    .child(self.placeholder.clone())
            };
        }

        let mut content = div().flex().flex_row().items_center();
        match self.buffer.selection_range().filter(|_| is_focused) {
            Some((start, end)) => {
                let value = self.buffer.text();
                let (before, rest) = value.split_at(char_to_byte(value, start));
                let (selected, after) =
                    rest.split_at(char_to_byte(rest, end - start));
                content = content
                    .child(text(before))
                    .child(
                        div()
                            .bg(rgba((colors.selection << 8) | 0x99))
                            .text_color(rgb(colors.text))
                            .child(selected.to_string()),
                    )
                    .child(text(after));
            }
            None => {
                let (before, after) = self.buffer.split_at_cursor();
                content = content.child(text(before));
                if is_focused {
                    content = content.child(caret(colors));
                }
                content = content.child(text(after));
            }
        }
        content
    }
}

fn char_to_byte(s: &str, chars: usize) -> usize {
    super::text_buffer::byte_idx_from_char_idx(s, chars)
}

fn caret(colors: FormColors) -> Div {
    div().w(px(2.)).h(px(28.)).bg(rgb(colors.cursor))
}

impl Focusable for TextField {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for TextField {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = self.colors;
        let is_focused = self.focus_handle.is_focused(window);

        let handle_click = cx.listener(
            |this: &mut Self, _event: &ClickEvent, window: &mut Window, cx: &mut Context<Self>| {
                this.focus_handle.focus(window, cx);
            },
        );

        let mut field = div()
            .id(ElementId::Name(format!("field-{}", self.id).into()))
            .track_focus(&self.focus_handle)
            .on_click(handle_click)
            .flex()
            .flex_row()
            .items_center()
            .h(px(64.))
            .px(px(12.))
            .bg(rgb(colors.field))
            .border_2()
            .border_color(rgb(colors.border_for(is_focused)))
            .rounded(px(8.))
            .text_2xl()
            .cursor_text()
            .overflow_hidden()
            .child(self.render_content(is_focused));

        field = match self.width {
            Some(width) => field.w(width),
            None => field.w_full(),
        };
        field
    }
}
