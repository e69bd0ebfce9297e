//! Inbound messages and outbound replies.

/// One inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name of the sender.
    pub author: String,
    pub text: String,
}

impl Message {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}

/// Text sent back to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// The transport should invalidate earlier triage prompts.
    pub invalidate_previous: bool,
    /// The reply is a triage prompt; the transport records its message id.
    pub prompt: bool,
}

impl Reply {
    /// A plain reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            invalidate_previous: false,
            prompt: false,
        }
    }

    /// A reply that presents a triage issue.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            prompt: true,
            ..Self::text(text)
        }
    }

    /// Asks the transport to invalidate earlier prompts.
    #[must_use]
    pub fn invalidating_previous(mut self) -> Self {
        self.invalidate_previous = true;
        self
    }
}
