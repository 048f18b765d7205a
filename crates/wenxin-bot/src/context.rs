//! Inbound request context supplied by the hosting framework.

use std::fmt;

/// How the framework classified an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    /// Plain text for the chat model.
    Text,
    /// A voice message.
    Voice,
    /// An inbound picture.
    Image,
    /// A request to draw a picture from the query text.
    ImageCreate,
    /// A file attachment.
    File,
    /// A shared link or card.
    Sharing,
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Voice => write!(f, "voice"),
            Self::Image => write!(f, "image"),
            Self::ImageCreate => write!(f, "image_create"),
            Self::File => write!(f, "file"),
            Self::Sharing => write!(f, "sharing"),
        }
    }
}

/// The request type plus the conversation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub kind: ContextType,
    /// Conversation key used to look up the session.
    pub session_id: String,
}

impl Context {
    pub fn new(kind: ContextType, session_id: impl Into<String>) -> Self {
        Self {
            kind,
            session_id: session_id.into(),
        }
    }

    /// A plain text request.
    pub fn text(session_id: impl Into<String>) -> Self {
        Self::new(ContextType::Text, session_id)
    }

    /// An image-creation request.
    pub fn image_create(session_id: impl Into<String>) -> Self {
        Self::new(ContextType::ImageCreate, session_id)
    }
}
