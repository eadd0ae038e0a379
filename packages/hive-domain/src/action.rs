//! Reply grammar: `Observation:` then `Thought:` then `Action:`, where the action payload starts
//! with `@search` (follow-up query) or `@answer` (final answer).

pub const OBSERVATION_MARKER: &str = "Observation:";
pub const THOUGHT_MARKER: &str = "Thought:";
pub const ACTION_MARKER: &str = "Action:";
pub const SEARCH_MARKER: &str = "@search";
pub const ANSWER_MARKER: &str = "@answer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	SearchAgain(String),
	FinalAnswer(String),
	Unparseable,
}
impl Action {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::SearchAgain(_) => "search_again",
			Self::FinalAnswer(_) => "final_answer",
			Self::Unparseable => "unparseable",
		}
	}
}

/// Why a reply did not yield an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
	#[error("Reply has no Observation section.")]
	MissingObservation,
	#[error("Reply has no Thought section after the Observation.")]
	MissingThought,
	#[error("Reply has no Action section after the Thought.")]
	MissingAction,
	#[error("Action payload starts with neither @search nor @answer.")]
	UnknownAction,
	#[error("Action payload is empty after its marker.")]
	EmptyPayload,
}

pub fn parse(reply: &str) -> Action {
	try_parse(reply).unwrap_or(Action::Unparseable)
}

/// Like [`parse`], but reports why the reply was rejected. Never returns `Ok(Unparseable)`.
pub fn try_parse(reply: &str) -> Result<Action, Malformed> {
	let payload = action_payload(reply)?;

	if let Some(query) = strip_marker(payload, SEARCH_MARKER) {
		return non_empty(query).map(Action::SearchAgain);
	}
	if let Some(answer) = strip_marker(payload, ANSWER_MARKER) {
		return non_empty(answer).map(Action::FinalAnswer);
	}

	Err(Malformed::UnknownAction)
}

fn action_payload(reply: &str) -> Result<&str, Malformed> {
	let observation = reply.find(OBSERVATION_MARKER).ok_or(Malformed::MissingObservation)?;
	let after_observation = &reply[observation + OBSERVATION_MARKER.len()..];
	let thought = after_observation.find(THOUGHT_MARKER).ok_or(Malformed::MissingThought)?;
	let after_thought = &after_observation[thought + THOUGHT_MARKER.len()..];
	let action = after_thought.rfind(ACTION_MARKER).ok_or(Malformed::MissingAction)?;

	Ok(after_thought[action + ACTION_MARKER.len()..].trim())
}

// The marker must end at a boundary, so `@searching` is not `@search`.
fn strip_marker<'a>(payload: &'a str, marker: &str) -> Option<&'a str> {
	let rest = payload.strip_prefix(marker)?;

	match rest.chars().next() {
		None => Some(rest),
		Some(c) if c == ':' || c.is_whitespace() => {
			let rest = rest.trim_start();

			Some(rest.strip_prefix(':').unwrap_or(rest))
		},
		Some(_) => None,
	}
}

fn non_empty(text: &str) -> Result<String, Malformed> {
	let trimmed = text.trim();

	if trimmed.is_empty() { Err(Malformed::EmptyPayload) } else { Ok(trimmed.to_string()) }
}
