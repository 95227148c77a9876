//! Popup entry form
//!
//! A frameless, always-on-top window asking for a title, a short episode
//! code and a "more" flag. The result is handed to a completion callback
//! exactly once: either the trimmed field values (confirm) or empty values
//! (Escape, window close).
//!
//! Key routing follows the delegated-focus pattern: the fields own the focus
//! handles, the root view's key listener handles Enter/Escape/Tab and
//! forwards everything else to the focused field.

use std::sync::Arc;

use gpui::*;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::components::{is_toggle_key, Button, FormColors, ImageToggle, TextField};
use crate::config::{FormConfig, DEFAULT_PLACEHOLDER_TITLE};
use crate::error::{BridgeError, Result};
use crate::preview::load_preview;
use crate::scraper::PageFetcher;

/// Heading shown when the caller does not set one
pub const DEFAULT_HEADING: &str = "Eingabe";

/// Focusable parts of the form, in Tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Episode,
    More,
}

impl FormField {
    const ORDER: [FormField; 3] = [Self::Title, Self::Episode, Self::More];

    fn position(self) -> usize {
        match self {
            Self::Title => 0,
            Self::Episode => 1,
            Self::More => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// A placeholder title needs editing first; a real one usually only
    /// needs the episode.
    pub fn initial_for(default_title: &str) -> Self {
        if default_title == DEFAULT_PLACEHOLDER_TITLE {
            Self::Title
        } else {
            Self::Episode
        }
    }
}

/// What a key press in the form does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Cancel,
    Confirm,
    Focus(FormField),
    FlipToggle,
    /// Editing key for the focused text field
    Edit(FormField),
    Ignore,
}

/// Map a key press to a form action. `key` is the lowercase gpui key name.
///
/// Space and Enter on the focused toggle flip it; Enter anywhere else
/// confirms.
pub fn key_action(key: &str, shift: bool, current: FormField) -> KeyAction {
    match key {
        "escape" => KeyAction::Cancel,
        "tab" if shift => KeyAction::Focus(current.previous()),
        "tab" => KeyAction::Focus(current.next()),
        k if current == FormField::More && is_toggle_key(k) => KeyAction::FlipToggle,
        "enter" => KeyAction::Confirm,
        _ if current == FormField::More => KeyAction::Ignore,
        _ => KeyAction::Edit(current),
    }
}

/// What the form shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    /// Header line, e.g. "Netflix-Eintrag"
    pub heading: String,
    /// Label above the fields, e.g. "Folgen"
    pub prompt: String,
    pub default_title: String,
    /// Preview image source (path, http(s) URL or data: URI)
    pub preview: Option<String>,
    pub initial_focus: FormField,
}

impl FormRequest {
    pub fn new(prompt: impl Into<String>, default_title: impl Into<String>) -> Self {
        let default_title = default_title.into();
        Self {
            heading: DEFAULT_HEADING.to_string(),
            prompt: prompt.into(),
            initial_focus: FormField::initial_for(&default_title),
            default_title,
            preview: None,
        }
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }

    pub fn with_preview(mut self, source: impl Into<String>) -> Self {
        let source = source.into();
        self.preview = if source.is_empty() { None } else { Some(source) };
        self
    }
}

/// Values entered by the user. Cancelling yields `FormOutcome::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormOutcome {
    pub title: String,
    pub episode: String,
    pub more: bool,
}

impl FormOutcome {
    pub fn cancelled() -> Self {
        Self::default()
    }

    /// Outcome of a confirmed form, text values trimmed
    pub fn confirmed(title: &str, episode: &str, more: bool) -> Self {
        Self {
            title: title.trim().to_string(),
            episode: episode.trim().to_string(),
            more,
        }
    }
}

/// Receives the form result (or the window error) exactly once
pub type FormCallback = Box<dyn FnOnce(Result<FormOutcome>) + Send + 'static>;

/// Shared slot holding the not-yet-called callback
type CompletionSlot = Arc<Mutex<Option<FormCallback>>>;

fn complete_once(slot: &CompletionSlot, result: Result<FormOutcome>) -> bool {
    let callback = slot.lock().take();
    match callback {
        Some(callback) => {
            callback(result);
            true
        }
        None => false,
    }
}

pub struct PopupForm {
    request: FormRequest,
    colors: FormColors,
    preview: Option<Arc<RenderImage>>,
    preview_size: f32,
    title_field: Entity<TextField>,
    episode_field: Entity<TextField>,
    toggle: Entity<ImageToggle>,
    /// Last field focused through the keyboard
    focused: FormField,
    did_initial_focus: bool,
    slot: CompletionSlot,
}

impl PopupForm {
    fn new(
        request: FormRequest,
        preview: Option<Arc<RenderImage>>,
        config: &FormConfig,
        slot: CompletionSlot,
        cx: &mut Context<Self>,
    ) -> Self {
        let colors = FormColors::default();
        let title_field = cx.new(|cx| {
            TextField::new("title", &request.default_title, "Titel...", None, colors, cx)
        });
        let episode_field = cx.new(|cx| {
            TextField::new(
                "episode",
                "",
                "Episode...",
                Some(config.episode_max_length),
                colors,
                cx,
            )
            .with_width(px(120.))
        });
        let toggle = cx.new(|cx| ImageToggle::new(false, colors, cx));

        Self {
            focused: request.initial_focus,
            request,
            colors,
            preview,
            preview_size: config.preview_size,
            title_field,
            episode_field,
            toggle,
            did_initial_focus: false,
            slot,
        }
    }

    fn focus_handle_for(&self, field: FormField, cx: &App) -> FocusHandle {
        match field {
            FormField::Title => self.title_field.read(cx).get_focus_handle(),
            FormField::Episode => self.episode_field.read(cx).get_focus_handle(),
            FormField::More => self.toggle.read(cx).get_focus_handle(),
        }
    }

    /// Field that really holds focus (a mouse click may have moved it)
    fn current_field(&self, window: &Window, cx: &App) -> FormField {
        FormField::ORDER
            .into_iter()
            .find(|&field| self.focus_handle_for(field, cx).is_focused(window))
            .unwrap_or(self.focused)
    }

    fn focus_field(&mut self, field: FormField, window: &mut Window, cx: &mut Context<Self>) {
        self.focused = field;
        self.focus_handle_for(field, cx).focus(window, cx);
        cx.notify();
    }

    fn confirm(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let outcome = FormOutcome::confirmed(
            self.title_field.read(cx).value(),
            self.episode_field.read(cx).value(),
            self.toggle.read(cx).is_checked(),
        );
        self.finish(outcome, window, cx);
    }

    fn finish(&mut self, outcome: FormOutcome, window: &mut Window, cx: &mut Context<Self>) {
        info!(
            event_type = "form_closed",
            cancelled = outcome == FormOutcome::cancelled(),
            more = outcome.more,
            "Popup form finished"
        );
        if complete_once(&self.slot, Ok(outcome)) {
            window.remove_window();
            cx.quit();
        }
    }

    fn handle_key(&mut self, event: &KeyDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        let key = event.keystroke.key.to_lowercase();
        let current = self.current_field(window, cx);
        let action = key_action(&key, event.keystroke.modifiers.shift, current);
        debug!(key = %key, field = ?current, ?action, "Form key");

        match action {
            KeyAction::Cancel => self.finish(FormOutcome::cancelled(), window, cx),
            KeyAction::Confirm => self.confirm(window, cx),
            KeyAction::Focus(target) => self.focus_field(target, window, cx),
            KeyAction::FlipToggle => self.toggle.update(cx, |toggle, cx| toggle.toggle(cx)),
            KeyAction::Edit(FormField::Title) => self
                .title_field
                .update(cx, |field, cx| field.handle_key_event(event, cx)),
            KeyAction::Edit(FormField::Episode) => self
                .episode_field
                .update(cx, |field, cx| field.handle_key_event(event, cx)),
            KeyAction::Edit(FormField::More) | KeyAction::Ignore => {}
        }
    }

    fn render_preview(&self) -> Option<AnyElement> {
        let image = self.preview.clone()?;
        let size = px(self.preview_size);
        Some(
            div()
                .flex()
                .justify_center()
                .w_full()
                .child(
                    img(move |_window: &mut Window, _cx: &mut App| Some(Ok(image.clone())))
                        .w(size)
                        .h(size)
                        .object_fit(ObjectFit::Contain),
                )
                .into_any_element(),
        )
    }
}

impl Focusable for PopupForm {
    fn focus_handle(&self, cx: &App) -> FocusHandle {
        self.focus_handle_for(self.focused, cx)
    }
}

impl Render for PopupForm {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let colors = self.colors;

        if !self.did_initial_focus {
            self.did_initial_focus = true;
            let handle = self.focus_handle_for(self.focused, cx);
            handle.focus(window, cx);
            debug!(field = ?self.focused, "Initial focus set");
        }

        let handle_key = cx.listener(
            |this: &mut Self, event: &KeyDownEvent, window: &mut Window, cx: &mut Context<Self>| {
                this.handle_key(event, window, cx);
            },
        );

        let entity = cx.entity();
        let ok_button = Button::new("OK", colors).shortcut("↵").on_click(Box::new(
            move |_event, window, cx| {
                entity.update(cx, |form, cx| form.confirm(window, cx));
            },
        ));

        div()
            .key_context("PopupForm")
            .on_key_down(handle_key)
            .flex()
            .flex_col()
            .items_center()
            .gap(px(16.))
            .size_full()
            .p(px(20.))
            .bg(rgb(colors.background))
            .text_color(rgb(colors.text))
            .child(
                div()
                    .w_full()
                    .text_sm()
                    .opacity(0.8)
                    .child(self.request.heading.clone()),
            )
            .child(
                div()
                    .w_full()
                    .text_2xl()
                    .font_weight(FontWeight::SEMIBOLD)
                    .child(self.request.prompt.clone()),
            )
            .children(self.render_preview())
            .child(self.title_field.clone())
            .child(
                div()
                    .flex()
                    .flex_row()
                    .items_center()
                    .gap(px(16.))
                    .w_full()
                    .child(self.episode_field.clone())
                    .child(self.toggle.clone()),
            )
            .child(ok_button)
    }
}

/// Open the popup and run the event loop until the user finishes.
///
/// The preview is fetched before the window opens. `on_done` receives the
/// outcome, or a `Window` error when the window cannot be created. On some
/// platforms the event loop never returns; `on_done` is where the caller
/// finishes its work.
pub fn show_popup(
    request: FormRequest,
    config: &FormConfig,
    fetcher: &dyn PageFetcher,
    on_done: FormCallback,
) {
    let preview = request
        .preview
        .as_deref()
        .and_then(|source| load_preview(source, fetcher));
    info!(
        event_type = "form_opened",
        heading = %request.heading,
        has_preview = preview.is_some(),
        initial_focus = ?request.initial_focus,
        "Showing popup form"
    );

    let slot: CompletionSlot = Arc::new(Mutex::new(Some(on_done)));
    let app_slot = slot.clone();
    let config = config.clone();

    Application::new().run(move |cx: &mut App| {
        let bounds = Bounds::centered(None, size(px(config.width), px(config.height)), cx);
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            titlebar: None,
            focus: true,
            show: true,
            kind: WindowKind::PopUp,
            is_resizable: false,
            ..Default::default()
        };

        let close_slot = app_slot.clone();
        let opened = cx.open_window(options, |window, cx| {
            window.on_window_should_close(cx, move |_window, _cx| {
                complete_once(&close_slot, Ok(FormOutcome::cancelled()));
                true
            });
            cx.new(|cx| PopupForm::new(request, preview, &config, app_slot.clone(), cx))
        });

        match opened {
            Ok(_) => cx.activate(true),
            Err(e) => {
                error!(error = %e, "Failed to open popup window");
                complete_once(&app_slot, Err(BridgeError::Window(e.to_string())));
                cx.quit();
            }
        }
    });

    // Event loop returned without an answer: treat as cancel
    complete_once(&slot, Ok(FormOutcome::cancelled()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cancel_is_empty_whatever_the_defaults() {
        let request = FormRequest::new("Folgen", "Babylon Berlin").with_preview("icon.png");
        assert_eq!(request.default_title, "Babylon Berlin");
        let outcome = FormOutcome::cancelled();
        assert_eq!(outcome, FormOutcome::default());
        assert_eq!(
            (outcome.title.as_str(), outcome.episode.as_str(), outcome.more),
            ("", "", false)
        );
    }

    #[test]
    fn test_confirmed_values_are_trimmed() {
        let outcome = FormOutcome::confirmed("  Dark \n", " S1E2 ", true);
        assert_eq!(outcome, FormOutcome {
            title: "Dark".to_string(),
            episode: "S1E2".to_string(),
            more: true,
        });
    }

    #[test]
    fn test_initial_focus_depends_on_placeholder() {
        assert_eq!(FormField::initial_for("Fill"), FormField::Title);
        assert_eq!(FormField::initial_for("Dark"), FormField::Episode);
        assert_eq!(FormRequest::new("Folgen", "Fill").initial_focus, FormField::Title);
    }

    #[test]
    fn test_tab_order_wraps() {
        assert_eq!(FormField::Title.next(), FormField::Episode);
        assert_eq!(FormField::More.next(), FormField::Title);
        assert_eq!(FormField::Title.previous(), FormField::More);
        assert_eq!(FormField::Episode.previous(), FormField::Title);
    }

    #[test]
    fn test_toggle_keys_flip_instead_of_confirming() {
        for key in ["space", " ", "enter"] {
            assert_eq!(key_action(key, false, FormField::More), KeyAction::FlipToggle, "{key}");
        }
        assert_eq!(key_action("a", false, FormField::More), KeyAction::Ignore);
    }

    #[test]
    fn test_enter_in_text_fields_confirms() {
        assert_eq!(key_action("enter", false, FormField::Title), KeyAction::Confirm);
        assert_eq!(key_action("enter", true, FormField::Episode), KeyAction::Confirm);
        assert_eq!(key_action("space", false, FormField::Title), KeyAction::Edit(FormField::Title));
        assert_eq!(key_action("x", false, FormField::Episode), KeyAction::Edit(FormField::Episode));
    }

    #[test]
    fn test_escape_cancels_from_any_field() {
        for field in FormField::ORDER {
            assert_eq!(key_action("escape", false, field), KeyAction::Cancel);
        }
    }

    #[test]
    fn test_tab_and_shift_tab_cycle_focus() {
        assert_eq!(key_action("tab", false, FormField::Title), KeyAction::Focus(FormField::Episode));
        assert_eq!(key_action("tab", false, FormField::More), KeyAction::Focus(FormField::Title));
        assert_eq!(key_action("tab", true, FormField::Title), KeyAction::Focus(FormField::More));
        assert_eq!(key_action("tab", true, FormField::More), KeyAction::Focus(FormField::Episode));
    }

    #[test]
    fn test_empty_preview_is_none() {
        let request = FormRequest::new("Folgen", "x").with_preview("");
        assert_eq!(request.preview, None);
        assert_eq!(request.heading, DEFAULT_HEADING);
    }

    #[test]
    fn test_completion_slot_fires_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let slot: CompletionSlot = Arc::new(Mutex::new(Some(Box::new(move |result| {
            assert_eq!(result.unwrap(), FormOutcome::cancelled());
            counter.fetch_add(1, Ordering::SeqCst);
        }))));

        assert!(complete_once(&slot, Ok(FormOutcome::cancelled())));
        assert!(!complete_once(&slot, Ok(FormOutcome::confirmed("a", "b", true))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
