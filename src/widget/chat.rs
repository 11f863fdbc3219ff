//! The chat widget component.

use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::message::{ChatLog, Message, Origin};
use super::view::ChatView;
use crate::error::Result;
use crate::transport::{ChatReply, ChatRequest, ChatTransport};

/// Whether overlapping submissions are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPolicy {
    /// Every send starts its own request; replies land in arrival order.
    #[default]
    Concurrent,
    /// The send trigger is disabled while a request is outstanding.
    SingleFlight,
}

/// A submission whose network exchange has not resolved yet.
///
/// Consumed by [`ChatWidget::complete`], so each attempt renders at most one
/// bot message.
#[derive(Debug)]
pub struct PendingRequest {
    /// Correlation id for logs.
    pub id: Uuid,
    /// Body to POST.
    pub request: ChatRequest,
    /// Mount generation the request was issued under.
    generation: u64,
}

/// Chat widget bound to a [`ChatView`].
///
/// # Lifecycle
///
/// A widget only reacts to send actions between [`mount`](Self::mount) and
/// [`unmount`](Self::unmount). Each submission then runs
/// `Idle → Sending → Rendered → Idle` independently of the others.
///
/// # Example
///
/// ```rust
/// use chat_widget::widget::{ChatView, ChatWidget, HeadlessView, SendPolicy};
///
/// let mut widget = ChatWidget::new(HeadlessView::default(), SendPolicy::Concurrent);
/// widget.mount();
///
/// widget.view_mut().set_input("  hello  ");
/// let pending = widget.begin_submit().expect("non-empty input");
/// assert_eq!(pending.request.message, "hello");
/// assert_eq!(widget.log().len(), 1);
/// ```
#[derive(Debug)]
pub struct ChatWidget<V> {
    view: V,
    log: ChatLog,
    policy: SendPolicy,
    in_flight: usize,
    mounted: bool,
    generation: u64,
}

impl<V: ChatView> ChatWidget<V> {
    /// Create an unmounted widget rendering into `view`.
    pub fn new(view: V, policy: SendPolicy) -> Self {
        Self {
            view,
            log: ChatLog::new(),
            policy,
            in_flight: 0,
            mounted: false,
            generation: 0,
        }
    }

    /// Start reacting to send actions.
    pub fn mount(&mut self) {
        if !self.mounted {
            self.mounted = true;
            self.generation += 1;
            self.view.set_send_enabled(true);
            info!(name: "chat.widget.mounted", policy = ?self.policy, "Chat widget mounted");
        }
    }

    /// Stop reacting to send actions. Outstanding completions are dropped.
    pub fn unmount(&mut self) {
        if self.mounted {
            self.mounted = false;
            info!(
                name: "chat.widget.unmounted",
                messages = self.log.len(),
                abandoned = self.in_flight,
                "Chat widget unmounted"
            );
            self.in_flight = 0;
        }
    }

    /// Whether the widget is mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of requests awaiting completion.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// The rendered log.
    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    /// The view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view, e.g. to type into the text field.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Consume the widget and return its view.
    pub fn into_view(self) -> V {
        self.view
    }

    /// Send policy in effect.
    pub fn policy(&self) -> SendPolicy {
        self.policy
    }

    /// Append a message, render it and scroll the log to the bottom.
    pub fn append_message(&mut self, text: impl Into<String>, origin: Origin) -> &Message {
        self.push(Message::new(text, origin))
    }

    fn push(&mut self, message: Message) -> &Message {
        self.view.render_message(&message);
        self.view.scroll_to_latest();
        self.log.append(message)
    }

    /// Synchronous half of a send action.
    ///
    /// Reads and trims the text field; when non-empty, appends the user
    /// message, clears the field and returns the request to send. Returns
    /// `None` without touching anything for blank input, an unmounted widget,
    /// or a busy single-flight widget.
    pub fn begin_submit(&mut self) -> Option<PendingRequest> {
        if !self.mounted {
            debug!(name: "chat.submit.ignored", reason = "unmounted", "Send ignored");
            return None;
        }
        if self.policy == SendPolicy::SingleFlight && self.in_flight > 0 {
            debug!(name: "chat.submit.ignored", reason = "busy", "Send ignored");
            return None;
        }

        let text = self.view.input_value().trim().to_string();
        if text.is_empty() {
            return None;
        }

        let id = Uuid::new_v4();
        debug!(name: "chat.submit.sending", request_id = %id, message = %text, "Sending message");

        self.push(Message::user(text.clone()));
        self.view.clear_input();

        self.in_flight += 1;
        if self.policy == SendPolicy::SingleFlight {
            self.view.set_send_enabled(false);
        }

        let request = ChatRequest { message: text };
        if let Ok(payload) = serde_json::to_string(&request) {
            debug!(name: "chat.submit.payload", request_id = %id, %payload, "Payload");
        }

        Some(PendingRequest {
            id,
            request,
            generation: self.generation,
        })
    }

    /// Completion half of a send action.
    ///
    /// Renders the reply, or `Error: <description>` for any failure. Returns
    /// `None` when the widget was unmounted while the request was in flight,
    /// even if it has been mounted again since.
    pub fn complete(
        &mut self,
        pending: PendingRequest,
        outcome: Result<ChatReply>,
    ) -> Option<&Message> {
        if !self.mounted || pending.generation != self.generation {
            debug!(
                name: "chat.reply.discarded",
                request_id = %pending.id,
                "Reply arrived after unmount"
            );
            return None;
        }

        self.in_flight = self.in_flight.saturating_sub(1);
        if self.policy == SendPolicy::SingleFlight && self.in_flight == 0 {
            self.view.set_send_enabled(true);
        }

        let message = match outcome {
            Ok(reply) => {
                debug!(name: "chat.reply.received", request_id = %pending.id, "Reply received");
                Message::bot(reply.response)
            }
            Err(err) => {
                if err.is_status() {
                    warn!(name: "chat.reply.failed", request_id = %pending.id, error = %err, "Endpoint returned an error");
                } else {
                    error!(name: "chat.reply.failed", request_id = %pending.id, error = %err, "Chat request failed");
                }
                Message::error(err)
            }
        };
        Some(self.push(message))
    }

    /// Run a whole send action against `transport`.
    ///
    /// Returns the bot message rendered for it, or `None` when the send was a
    /// no-op.
    pub async fn submit<T>(&mut self, transport: &T) -> Option<&Message>
    where
        T: ChatTransport + ?Sized,
    {
        let pending = self.begin_submit()?;
        let outcome = transport.send(&pending.request).await;
        self.complete(pending, outcome)
    }
}
