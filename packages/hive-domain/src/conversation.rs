use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	System,
	Human,
	Agent,
}
impl Role {
	/// Role name in OpenAI-style chat payloads.
	pub fn chat_role(self) -> &'static str {
		match self {
			Self::System => "system",
			Self::Human => "user",
			Self::Agent => "assistant",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
	pub role: Role,
	pub text: String,
}

/// Memory for one question: the system message followed by alternating human and agent turns.
///
/// The system message is fixed at construction and survives every operation.
#[derive(Debug, Clone)]
pub struct ConversationState {
	messages: Vec<Message>,
}
impl ConversationState {
	pub fn new(system: impl Into<String>) -> Self {
		Self { messages: vec![Message { role: Role::System, text: system.into() }] }
	}

	pub fn append_human(&mut self, text: impl Into<String>) {
		self.messages.push(Message { role: Role::Human, text: text.into() });
	}

	pub fn append_agent(&mut self, text: impl Into<String>) {
		self.messages.push(Message { role: Role::Agent, text: text.into() });
	}

	pub fn reset(&mut self) {
		self.messages.truncate(1);
	}

	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	/// True when only the system message remains.
	pub fn is_fresh(&self) -> bool {
		self.messages.len() == 1
	}
}
