//! Chat widget core.
//!
//! - [`Message`] / [`Origin`] / [`ChatLog`]: the append-only message model
//! - [`ChatView`]: the seam to the host's text field, send trigger and log container
//! - [`ChatWidget`]: the component tying a view to a transport
//!
//! # Example
//!
//! ```rust
//! use chat_widget::widget::{ChatWidget, HeadlessView, Origin, SendPolicy};
//!
//! let mut widget = ChatWidget::new(HeadlessView::default(), SendPolicy::Concurrent);
//! widget.mount();
//! widget.append_message("Welcome!", Origin::Bot);
//!
//! assert_eq!(widget.log().len(), 1);
//! ```

mod chat;
mod message;
mod view;

pub use chat::{ChatWidget, PendingRequest, SendPolicy};
pub use message::{ChatLog, ERROR_PREFIX, Message, Origin};
pub use view::{ChatView, HeadlessView};
