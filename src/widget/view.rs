//! The rendering seam between the widget and its host.
//!
//! A [`ChatView`] stands in for the three page elements the widget needs:
//! the text field, the send trigger and the scrollable log container.

use super::message::{Message, Origin};

/// Host-side surface the widget renders into.
pub trait ChatView {
    /// Current contents of the text field.
    fn input_value(&self) -> String;

    /// Replace the contents of the text field (keystrokes landing in it).
    fn set_input(&mut self, text: &str);

    /// Empty the text field.
    fn clear_input(&mut self);

    /// Render one appended message at the bottom of the log container.
    fn render_message(&mut self, message: &Message);

    /// Scroll the log container to its maximum offset.
    fn scroll_to_latest(&mut self);

    /// Enable or disable the send trigger. Hosts without one ignore this.
    fn set_send_enabled(&mut self, _enabled: bool) {}
}

/// In-memory view with a simulated scroll container.
///
/// Each rendered message contributes one row per line of text to the
/// container height; the viewport shows `viewport_rows` rows at a time.
#[derive(Debug, Clone)]
pub struct HeadlessView {
    input: String,
    rendered: Vec<Message>,
    viewport_rows: usize,
    content_rows: usize,
    scroll_offset: usize,
    send_enabled: bool,
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self::new(10)
    }
}

impl HeadlessView {
    /// Create a view whose viewport shows `viewport_rows` rows.
    pub fn new(viewport_rows: usize) -> Self {
        Self {
            input: String::new(),
            rendered: Vec::new(),
            viewport_rows,
            content_rows: 0,
            scroll_offset: 0,
            send_enabled: true,
        }
    }

    /// Messages rendered so far, oldest first.
    pub fn rendered(&self) -> &[Message] {
        &self.rendered
    }

    /// Current scroll offset of the log container.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Largest scroll offset the content allows.
    pub fn max_scroll_offset(&self) -> usize {
        self.content_rows.saturating_sub(self.viewport_rows)
    }

    /// Scroll to an arbitrary offset, clamped to the content.
    pub fn scroll_to(&mut self, offset: usize) {
        self.scroll_offset = offset.min(self.max_scroll_offset());
    }

    /// Whether the send trigger is enabled.
    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    /// Rendered messages from one origin.
    pub fn rendered_by(&self, origin: Origin) -> impl Iterator<Item = &Message> {
        self.rendered.iter().filter(move |m| m.origin == origin)
    }
}

impl ChatView for HeadlessView {
    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn render_message(&mut self, message: &Message) {
        self.content_rows += message.text.lines().count().max(1);
        self.rendered.push(message.clone());
    }

    fn scroll_to_latest(&mut self) {
        self.scroll_offset = self.max_scroll_offset();
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }
}
