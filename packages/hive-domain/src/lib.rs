pub mod action;
pub mod conversation;
pub mod passage;
pub mod prompt;
pub mod ranking;
pub mod scoring;

mod error;

pub use action::Action;
pub use conversation::{ConversationState, Message, Role};
pub use error::{Error, Result};
pub use passage::{Document, DocumentPayload, Passage, ScoredPassage};
