use std::{
	future::Future,
	sync::{Arc, atomic::Ordering},
	time::Duration,
};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{AnswerMode, Error, FailureKind, HiveService, Result};
use hive_domain::{
	Action, ConversationState, Document, Role, ScoredPassage, action, prompt, ranking,
};

/// Where a question flow currently is. Logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
	Idle,
	Embedding,
	Ranking,
	Prompting,
	AwaitingModel,
	ActionDecision,
	/// A search requested by the model; the second hop under the default budget.
	FollowUpHop,
	/// Deciding on the last reply the budget allows. Only an answer is accepted here.
	FinalDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassageHit {
	pub title: String,
	pub heading: String,
	pub content: String,
	pub similarity: f32,
	pub distance: f32,
	/// 0 for the user's query, 1.. for searches the model asked for.
	pub hop: u32,
}
impl PassageHit {
	fn from_scored(scored: &ScoredPassage, hop: u32) -> Self {
		Self {
			title: scored.passage.title.clone(),
			heading: scored.passage.heading.clone(),
			content: scored.passage.content.clone(),
			similarity: scored.similarity,
			distance: scored.distance,
			hop,
		}
	}

	pub fn label(&self) -> String {
		format!("{} - {}", self.title, self.heading)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
	Answered { answer: String },
	NoAnswer { kind: FailureKind, message: String },
	/// A newer question started before this one finished.
	Superseded { latest_generation: u64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
	pub trace_id: Uuid,
	pub generation: u64,
	pub query: String,
	pub hops: u32,
	pub results: Vec<PassageHit>,
	pub outcome: Outcome,
}
impl AskResponse {
	pub fn answer(&self) -> Option<&str> {
		match &self.outcome {
			Outcome::Answered { answer } => Some(answer),
			_ => None,
		}
	}

	pub fn failure(&self) -> Option<FailureKind> {
		match &self.outcome {
			Outcome::NoAnswer { kind, .. } => Some(*kind),
			_ => None,
		}
	}
}

/// One question from submission to termination.
///
/// The flow owns its conversation and a snapshot of the document taken at [`HiveService::begin`],
/// so replacing the document mid-flight does not affect it.
pub struct QuestionFlow {
	pub trace_id: Uuid,
	pub generation: u64,
	query: String,
	document: Option<Arc<Document>>,
	conversation: ConversationState,
	results: Vec<PassageHit>,
	hops: u32,
	state: FlowState,
}
impl QuestionFlow {
	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn state(&self) -> FlowState {
		self.state
	}

	pub fn hops(&self) -> u32 {
		self.hops
	}

	pub fn conversation(&self) -> &ConversationState {
		&self.conversation
	}

	pub fn results(&self) -> &[PassageHit] {
		&self.results
	}

	fn transition(&mut self, next: FlowState) {
		tracing::debug!(
			trace_id = %self.trace_id,
			generation = self.generation,
			from = ?self.state,
			to = ?next,
			"Question flow transition."
		);

		self.state = next;
	}

	// Results are replaced with a new list on every hop.
	fn merge(&mut self, scored: &[ScoredPassage], hop: u32) {
		let mut results = Vec::with_capacity(self.results.len() + scored.len());

		results.extend(self.results.iter().cloned());
		results.extend(scored.iter().map(|passage| PassageHit::from_scored(passage, hop)));

		self.results = results;
	}
}

impl HiveService {
	/// Starts a question. Every non-blank query takes a new generation, which makes all earlier
	/// flows stale. A blank query reuses the current generation and never publishes.
	pub fn begin(&self, query: impl Into<String>) -> QuestionFlow {
		let query = query.into();
		let generation = if query.trim().is_empty() {
			self.generation.load(Ordering::SeqCst)
		} else {
			self.generation.fetch_add(1, Ordering::SeqCst) + 1
		};

		QuestionFlow {
			trace_id: Uuid::new_v4(),
			generation,
			query,
			document: self.active_document(),
			conversation: ConversationState::new(prompt::SYSTEM_PROMPT),
			results: Vec::new(),
			hops: 0,
			state: FlowState::Idle,
		}
	}

	pub async fn ask(&self, query: impl Into<String>) -> AskResponse {
		let mut flow = self.begin(query);

		self.drive(&mut flow).await
	}

	/// Runs the flow to termination and publishes the result unless a newer flow has started.
	///
	/// The conversation is reset before returning, whatever the outcome.
	pub async fn drive(&self, flow: &mut QuestionFlow) -> AskResponse {
		let result = match self.answer_mode() {
			AnswerMode::Agent => self.run_agent(flow).await,
			AnswerMode::Direct => self.run_direct(flow).await,
		};

		flow.conversation.reset();
		flow.transition(FlowState::Idle);

		debug_assert!(flow.conversation.is_fresh());

		let outcome = match result {
			Ok(answer) => Outcome::Answered { answer },
			Err(err) => {
				let kind = err.kind();

				tracing::warn!(
					trace_id = %flow.trace_id,
					generation = flow.generation,
					kind = kind.as_str(),
					error = %err,
					"Question ended without an answer."
				);

				Outcome::NoAnswer { kind, message: err.to_string() }
			},
		};
		let response = AskResponse {
			trace_id: flow.trace_id,
			generation: flow.generation,
			query: flow.query.clone(),
			hops: flow.hops,
			results: flow.results.clone(),
			outcome,
		};

		self.publish(response)
	}

	/// The result of the newest question that finished while no newer one had started.
	///
	/// Starting a question does not clear it; the slot changes only when a current flow publishes.
	pub fn latest(&self) -> Option<AskResponse> {
		self.latest.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn current_generation(&self) -> u64 {
		self.generation.load(Ordering::SeqCst)
	}

	fn publish(&self, response: AskResponse) -> AskResponse {
		if response.failure() == Some(FailureKind::InvalidQuery) {
			return response;
		}

		let mut latest = self.latest.lock().unwrap_or_else(|err| err.into_inner());
		let current = self.generation.load(Ordering::SeqCst);

		if response.generation != current {
			tracing::info!(
				trace_id = %response.trace_id,
				generation = response.generation,
				latest_generation = current,
				"Discarded result of a superseded question."
			);

			return AskResponse {
				outcome: Outcome::Superseded { latest_generation: current },
				results: Vec::new(),
				..response
			};
		}

		if let Some(answer) = response.answer() {
			tracing::info!(
				trace_id = %response.trace_id,
				generation = response.generation,
				hops = response.hops,
				answer_len = answer.len(),
				"Answer published."
			);
		}

		*latest = Some(response.clone());

		response
	}

	async fn run_agent(&self, flow: &mut QuestionFlow) -> Result<String> {
		let (document, query) = prepare(flow)?;
		let max_hops = self.cfg.retrieval.max_hops;
		let passages = self.search(flow, &document, &query).await?;

		flow.merge(&passages, 0);
		flow.transition(FlowState::Prompting);
		flow.conversation.append_human(prompt::primary(&query, &passages));

		let mut reply = self.invoke(flow, true).await?;

		loop {
			let terminal = flow.hops >= max_hops;

			flow.transition(if terminal {
				FlowState::FinalDecision
			} else {
				FlowState::ActionDecision
			});

			let action = action::parse(&reply);

			tracing::debug!(
				trace_id = %flow.trace_id,
				hop = flow.hops,
				action = action.as_str(),
				"Model reply classified."
			);

			match action {
				Action::FinalAnswer(answer) => return Ok(answer),
				Action::SearchAgain(_) if terminal =>
					return Err(Error::HopBudgetExhausted { hops: max_hops }),
				Action::SearchAgain(next) => {
					flow.hops += 1;

					tracing::debug!(
						trace_id = %flow.trace_id,
						hop = flow.hops,
						query = %next,
						"Model requested another search."
					);

					flow.transition(FlowState::FollowUpHop);

					let passages = self.search(flow, &document, &next).await?;
					let must_answer = flow.hops >= max_hops;

					flow.merge(&passages, flow.hops);
					flow.transition(FlowState::Prompting);
					flow.conversation.append_human(prompt::continuation(
						flow.hops,
						&passages,
						must_answer,
					));

					reply = self.invoke(flow, true).await?;
				},
				Action::Unparseable => {
					let message = action::try_parse(&reply)
						.err()
						.map(|malformed| malformed.to_string())
						.unwrap_or_default();

					return Err(Error::UnparseableAction { message });
				},
			}
		}
	}

	async fn run_direct(&self, flow: &mut QuestionFlow) -> Result<String> {
		let (document, query) = prepare(flow)?;
		let passages = self.search(flow, &document, &query).await?;

		flow.merge(&passages, 0);
		flow.transition(FlowState::Prompting);
		flow.conversation.append_human(prompt::direct(&query, &passages));

		let reply = self.invoke(flow, false).await?;

		flow.transition(FlowState::FinalDecision);

		let answer = reply.trim();

		if answer.is_empty() {
			return Err(Error::UnparseableAction {
				message: "Model returned an empty answer.".to_string(),
			});
		}

		Ok(answer.to_string())
	}

	async fn search(
		&self,
		flow: &mut QuestionFlow,
		document: &Document,
		query: &str,
	) -> Result<Vec<ScoredPassage>> {
		flow.transition(FlowState::Embedding);

		let cfg = &self.cfg.providers.embedding;
		let vector =
			within(cfg.timeout_ms, "Embedding", self.providers.embedding.embed_query(cfg, query))
				.await?;

		if vector.is_empty() {
			return Err(Error::MalformedEmbedding {
				message: "Query embedding is empty.".to_string(),
			});
		}
		if vector.len() != document.dimensions() {
			return Err(Error::MalformedEmbedding {
				message: format!(
					"Query embedding has {} dimensions; document passages have {}.",
					vector.len(),
					document.dimensions()
				),
			});
		}

		flow.transition(FlowState::Ranking);

		Ok(ranking::rank(document.passages(), &vector, self.cfg.retrieval.top_k as usize))
	}

	async fn invoke(&self, flow: &mut QuestionFlow, with_system: bool) -> Result<String> {
		flow.transition(FlowState::AwaitingModel);

		let cfg = &self.cfg.providers.llm;
		let messages = chat_messages(&flow.conversation, with_system);

		tracing::debug!(
			trace_id = %flow.trace_id,
			turns = flow.conversation.len(),
			sent = messages.len(),
			"Calling completion provider."
		);
		let reply =
			within(cfg.timeout_ms, "Completion", self.providers.completion.complete(cfg, &messages))
				.await?;

		flow.conversation.append_agent(reply.clone());

		Ok(reply)
	}
}

fn prepare(flow: &QuestionFlow) -> Result<(Arc<Document>, String)> {
	let query = flow.query.trim();

	if query.is_empty() {
		return Err(Error::InvalidQuery { message: "Query must not be empty.".to_string() });
	}

	let document = flow.document.clone().ok_or(Error::NoDocument)?;

	Ok((document, query.to_string()))
}

fn chat_messages(conversation: &ConversationState, with_system: bool) -> Vec<Value> {
	conversation
		.messages()
		.iter()
		.filter(|message| with_system || message.role != Role::System)
		.map(|message| {
			serde_json::json!({ "role": message.role.chat_role(), "content": message.text })
		})
		.collect()
}

async fn within<T, F>(timeout_ms: u64, what: &str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
		Ok(result) => result,
		Err(_) => Err(Error::Network {
			message: format!("{what} request timed out after {timeout_ms} ms."),
		}),
	}
}
