pub mod ask;
pub mod document;

mod error;

pub use ask::{AskResponse, FlowState, Outcome, PassageHit, QuestionFlow};
pub use document::DocumentSummary;
pub use error::{Error, FailureKind, Result};

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex, RwLock, atomic::AtomicU64},
};

use serde_json::Value;

use hive_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use hive_domain::Document;
use hive_providers::{completion, embedding};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_query<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	/// `messages` are OpenAI-style `{ "role", "content" }` objects, oldest first.
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub completion: Arc<dyn CompletionProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		completion: Arc<dyn CompletionProvider>,
	) -> Self {
		Self { embedding, completion }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(HttpProviders);

		Self { embedding: provider.clone(), completion: provider }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
	Agent,
	Direct,
}

/// Retrieval and answering over one active document.
///
/// Each question runs as its own [`QuestionFlow`]; only the newest flow may publish to the
/// latest-result slot.
pub struct HiveService {
	pub cfg: Config,
	pub providers: Providers,
	document: RwLock<Option<Arc<Document>>>,
	generation: AtomicU64,
	latest: Mutex<Option<AskResponse>>,
}
impl HiveService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self {
			cfg,
			providers,
			document: RwLock::new(None),
			generation: AtomicU64::new(0),
			latest: Mutex::new(None),
		}
	}

	pub fn answer_mode(&self) -> AnswerMode {
		match self.cfg.retrieval.answer_mode.as_str() {
			"direct" => AnswerMode::Direct,
			_ => AnswerMode::Agent,
		}
	}
}

struct HttpProviders;

impl EmbeddingProvider for HttpProviders {
	fn embed_query<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { embedding::embed_query(cfg, query).await.map_err(Error::from_embedding) })
	}
}

impl CompletionProvider for HttpProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			completion::complete(cfg, messages).await.map_err(Error::from_completion)
		})
	}
}
