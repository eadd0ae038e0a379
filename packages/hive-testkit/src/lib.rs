//! Scripted providers and fixtures for exercising question flows without network access.

use std::{
	collections::{HashMap, VecDeque},
	sync::{Arc, Mutex},
	time::Duration,
};

use serde_json::{Map, Value};

use hive_config::{Config, EmbeddingProviderConfig, LlmProviderConfig, Providers, Retrieval, Service};
use hive_domain::Passage;
use hive_service::{BoxFuture, CompletionProvider, EmbeddingProvider, Error, Result};

pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				path: "/embedding".to_string(),
				api_key: None,
				dimensions: None,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				path: "/v1/chat/completions".to_string(),
				api_key: None,
				model: "test-model".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				mode: "chat".to_string(),
				default_headers: Map::new(),
			},
		},
		retrieval: Retrieval::default(),
	}
}

pub fn passage(title: &str, heading: &str, embedding: &[f32]) -> Passage {
	Passage {
		title: title.to_string(),
		heading: heading.to_string(),
		content: format!("Notes on {heading}."),
		embedding: embedding.to_vec(),
	}
}

/// A well-formed agent reply carrying `action`, e.g. `@answer: 42`.
pub fn agent_reply(action: &str) -> String {
	format!("Observation: The context was read.\nThought: Decide what to do next.\nAction: {action}")
}

pub fn providers(
	embedding: Arc<ScriptedEmbedding>,
	completion: Arc<ScriptedCompletion>,
) -> hive_service::Providers {
	hive_service::Providers::new(embedding, completion)
}

#[derive(Debug, Clone)]
enum EmbeddingStep {
	Vector(Vec<f32>),
	Network,
	Malformed,
}

/// Embedding provider answering from a per-query table.
#[derive(Debug, Default)]
pub struct ScriptedEmbedding {
	steps: HashMap<String, EmbeddingStep>,
	fallback: Option<Vec<f32>>,
	delay: Option<Duration>,
	calls: Mutex<Vec<String>>,
}
impl ScriptedEmbedding {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_vector(mut self, query: &str, vector: Vec<f32>) -> Self {
		self.steps.insert(query.to_string(), EmbeddingStep::Vector(vector));

		self
	}

	/// Vector returned for any query without its own entry.
	pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
		self.fallback = Some(vector);

		self
	}

	pub fn with_network_failure(mut self, query: &str) -> Self {
		self.steps.insert(query.to_string(), EmbeddingStep::Network);

		self
	}

	pub fn with_malformed_response(mut self, query: &str) -> Self {
		self.steps.insert(query.to_string(), EmbeddingStep::Malformed);

		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	/// Queries received so far, in call order.
	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn call_count(&self) -> usize {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	fn resolve(&self, query: &str) -> Result<Vec<f32>> {
		let step = self
			.steps
			.get(query)
			.cloned()
			.or_else(|| self.fallback.clone().map(EmbeddingStep::Vector));

		match step {
			Some(EmbeddingStep::Vector(vector)) => Ok(vector),
			Some(EmbeddingStep::Network) =>
				Err(Error::Network { message: format!("Connection refused for {query:?}.") }),
			Some(EmbeddingStep::Malformed) => Err(Error::MalformedEmbedding {
				message: "Embedding response is missing a numeric embedding array.".to_string(),
			}),
			None => Err(Error::Network { message: format!("No embedding scripted for {query:?}.") }),
		}
	}
}

impl EmbeddingProvider for ScriptedEmbedding {
	fn embed_query<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move {
			self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(query.to_string());

			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}

			self.resolve(query)
		})
	}
}

#[derive(Debug, Clone)]
pub enum Step {
	Reply(String),
	Delayed(String, Duration),
	Fail(String),
}
impl Step {
	pub fn reply(text: impl Into<String>) -> Self {
		Self::Reply(text.into())
	}

	pub fn delayed(text: impl Into<String>, millis: u64) -> Self {
		Self::Delayed(text.into(), Duration::from_millis(millis))
	}

	pub fn fail(message: impl Into<String>) -> Self {
		Self::Fail(message.into())
	}
}

/// Completion provider replaying a queue of steps and recording every history it receives.
///
/// Rules take precedence over the queue: a rule fires whenever the newest message contains its
/// needle, which keeps concurrent flows deterministic.
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
	queue: Mutex<VecDeque<Step>>,
	rules: Vec<(String, Step)>,
	histories: Mutex<Vec<Vec<Value>>>,
}
impl ScriptedCompletion {
	pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
		Self { queue: Mutex::new(steps.into_iter().collect()), ..Self::default() }
	}

	pub fn with_rule(mut self, needle: &str, step: Step) -> Self {
		self.rules.push((needle.to_string(), step));

		self
	}

	/// Message histories received so far, one per call.
	pub fn histories(&self) -> Vec<Vec<Value>> {
		self.histories.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn call_count(&self) -> usize {
		self.histories.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	fn next_step(&self, messages: &[Value]) -> Option<Step> {
		let newest = messages.last().and_then(|message| message["content"].as_str()).unwrap_or("");
		let rule = self.rules.iter().find(|(needle, _)| newest.contains(needle.as_str()));

		match rule {
			Some((_, step)) => Some(step.clone()),
			None => self.queue.lock().unwrap_or_else(|err| err.into_inner()).pop_front(),
		}
	}
}

impl CompletionProvider for ScriptedCompletion {
	fn complete<'a>(
		&'a self,
		_: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			self.histories.lock().unwrap_or_else(|err| err.into_inner()).push(messages.to_vec());

			match self.next_step(messages) {
				Some(Step::Reply(text)) => Ok(text),
				Some(Step::Delayed(text, delay)) => {
					tokio::time::sleep(delay).await;

					Ok(text)
				},
				Some(Step::Fail(message)) => Err(Error::Network { message }),
				None => Err(Error::Network { message: "Completion script is exhausted.".to_string() }),
			}
		})
	}
}
