use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

/// Query embedding endpoint, called as `GET {api_base}{path}?query=...`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub path: String,
	#[serde(default)]
	pub api_key: Option<String>,
	/// Optional. When set, documents and query vectors must have exactly this many dimensions.
	#[serde(default)]
	pub dimensions: Option<u32>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub path: String,
	#[serde(default)]
	pub api_key: Option<String>,
	pub model: String,
	#[serde(default)]
	pub temperature: f32,
	pub timeout_ms: u64,
	/// One of "chat" (OpenAI-style chat completions) or "answer" (plain-text `GET ?q=`).
	#[serde(default = "default_llm_mode")]
	pub mode: String,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	/// Extra search hops the model may request after the first one.
	pub max_hops: u32,
	/// One of "agent" (search-then-answer loop) or "direct" (single-shot answer).
	pub answer_mode: String,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { top_k: crate::DEFAULT_TOP_K, max_hops: 1, answer_mode: "agent".to_string() }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_llm_mode() -> String {
	"chat".to_string()
}
