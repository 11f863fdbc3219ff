//! Terminal host for the chat widget.
//!
//! Each input line is typed into the text field and followed by an Enter
//! key event. Network calls run in spawned tasks and report back over a
//! channel, so the event loop stays responsive while requests are in flight.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chat_widget::host::{self, TerminalView};
//! use chat_widget::transport::HttpTransport;
//! use chat_widget::widget::{ChatWidget, SendPolicy};
//! use tokio::io::BufReader;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new("http://localhost:8000", "/api/chat/")?);
//! let mut widget = ChatWidget::new(TerminalView::new(std::io::stdout()), SendPolicy::Concurrent);
//! host::run(&mut widget, transport, BufReader::new(tokio::io::stdin())).await?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::transport::{ChatReply, ChatTransport};
use crate::widget::{ChatView, ChatWidget, Message, Origin, PendingRequest};

/// Input line that unmounts the widget immediately.
pub const QUIT_COMMAND: &str = "/quit";

/// Renders the chat log as lines of text.
///
/// User messages are indented to set them apart from bot messages.
#[derive(Debug)]
pub struct TerminalView<W> {
    out: W,
    input: String,
    send_enabled: bool,
}

impl<W: Write> TerminalView<W> {
    /// Create a view writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            input: String::new(),
            send_enabled: true,
        }
    }

    /// Consume the view and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Whether the send trigger is enabled.
    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }
}

impl<W: Write> ChatView for TerminalView<W> {
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
        let (indent, label) = match message.origin {
            Origin::User => ("    ", "you"),
            Origin::Bot => ("", "bot"),
        };
        let mut lines = message.text.lines();
        let first = lines.next().unwrap_or_default();
        let written = writeln!(self.out, "{indent}{label}> {first}").and_then(|()| {
            lines.try_for_each(|line| writeln!(self.out, "{indent}     {line}"))
        });
        if let Err(err) = written {
            warn!(name: "chat.render.failed", error = %err, "Failed to write message");
        }
    }

    fn scroll_to_latest(&mut self) {
        // The terminal already sits at the bottom once the buffer is flushed
        if let Err(err) = self.out.flush() {
            warn!(name: "chat.render.failed", error = %err, "Failed to flush output");
        }
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }
}

type Completion = (PendingRequest, Result<ChatReply>);

/// Drive `widget` from `input` until end of input or [`QUIT_COMMAND`].
///
/// Mounts the widget on entry and unmounts it on exit, including when reading
/// input fails. At end of input the loop waits for outstanding replies;
/// `/quit` abandons them. Lines that are not valid UTF-8 are skipped.
pub async fn run<V, R>(
    widget: &mut ChatWidget<V>,
    transport: Arc<dyn ChatTransport>,
    mut input: R,
) -> std::io::Result<()>
where
    V: ChatView,
    R: AsyncBufRead + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    // Partial reads stay in `buf` when the other branch wins the select
    let mut buf = Vec::new();
    let mut input_open = true;
    let mut failure = None;

    widget.mount();

    loop {
        if !input_open && widget.in_flight() == 0 {
            break;
        }

        tokio::select! {
            read = input.read_until(b'\n', &mut buf), if input_open => {
                match read {
                    Ok(0) => {
                        debug!(name: "chat.host.eof", pending = widget.in_flight(), "Input closed");
                        input_open = false;
                        continue;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        error!(name: "chat.host.input_failed", error = %err, "Failed to read input");
                        failure = Some(err);
                        break;
                    }
                }

                let line = std::mem::take(&mut buf);
                let Some(line) = decode_line(line) else {
                    continue;
                };
                if line.trim() == QUIT_COMMAND {
                    break;
                }

                widget.view_mut().set_input(&line);
                if let Some(pending) = widget.begin_submit() {
                    let transport = Arc::clone(&transport);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let outcome = transport.send(&pending.request).await;
                        // Receiver is gone once the widget unmounts
                        let _ = tx.send((pending, outcome));
                    });
                }
            }
            Some((pending, outcome)) = rx.recv() => {
                widget.complete(pending, outcome);
            }
        }
    }

    widget.unmount();
    failure.map_or(Ok(()), Err)
}

/// Strip the line terminator; `None` for lines that are not UTF-8.
fn decode_line(mut line: Vec<u8>) -> Option<String> {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    match String::from_utf8(line) {
        Ok(line) => Some(line),
        Err(err) => {
            warn!(
                name: "chat.host.invalid_input",
                error = %err.utf8_error(),
                "Skipping input line that is not valid UTF-8"
            );
            None
        }
    }
}
