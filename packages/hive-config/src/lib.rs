mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, EmbeddingProviderConfig, LlmProviderConfig, Providers, Retrieval, Service};

use std::{fs, path::Path};

/// `retrieval.top_k` when the section or key is omitted.
pub const DEFAULT_TOP_K: u32 = 3;
/// Upper bound accepted for `retrieval.max_hops`.
pub const MAX_HOPS_LIMIT: u32 = 8;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::invalid("service.http_bind", "must be non-empty."));
	}

	let embedding = &cfg.providers.embedding;

	if embedding.api_base.trim().is_empty() {
		return Err(Error::invalid("providers.embedding.api_base", "must be non-empty."));
	}
	if embedding.timeout_ms == 0 {
		return Err(Error::invalid("providers.embedding.timeout_ms", "must be greater than zero."));
	}
	if embedding.dimensions == Some(0) {
		return Err(Error::invalid("providers.embedding.dimensions", "must be greater than zero."));
	}

	validate_headers("providers.embedding.default_headers", &embedding.default_headers)?;

	let llm = &cfg.providers.llm;

	if llm.api_base.trim().is_empty() {
		return Err(Error::invalid("providers.llm.api_base", "must be non-empty."));
	}
	if llm.timeout_ms == 0 {
		return Err(Error::invalid("providers.llm.timeout_ms", "must be greater than zero."));
	}
	if !llm.temperature.is_finite() {
		return Err(Error::invalid("providers.llm.temperature", "must be a finite number."));
	}
	if !(0.0..=2.0).contains(&llm.temperature) {
		return Err(Error::invalid("providers.llm.temperature", "must be in the range 0.0-2.0."));
	}
	if !matches!(llm.mode.as_str(), "chat" | "answer") {
		return Err(Error::invalid("providers.llm.mode", "must be one of chat or answer."));
	}
	if llm.mode == "chat" && llm.model.trim().is_empty() {
		return Err(Error::invalid("providers.llm.model", "must be non-empty in chat mode."));
	}

	validate_headers("providers.llm.default_headers", &llm.default_headers)?;

	let retrieval = &cfg.retrieval;

	if retrieval.top_k == 0 {
		return Err(Error::invalid("retrieval.top_k", "must be greater than zero."));
	}
	if retrieval.max_hops > MAX_HOPS_LIMIT {
		return Err(Error::invalid(
			"retrieval.max_hops",
			format!("must be {MAX_HOPS_LIMIT} or less."),
		));
	}
	if !matches!(retrieval.answer_mode.as_str(), "agent" | "direct") {
		return Err(Error::invalid("retrieval.answer_mode", "must be one of agent or direct."));
	}

	Ok(())
}

fn validate_headers(
	field: &'static str,
	headers: &serde_json::Map<String, serde_json::Value>,
) -> Result<()> {
	if headers.values().all(|value| value.is_string()) {
		Ok(())
	} else {
		Err(Error::invalid(field, "values must be strings."))
	}
}

fn normalize(cfg: &mut Config) {
	for key in [&mut cfg.providers.embedding.api_key, &mut cfg.providers.llm.api_key] {
		if key.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false) {
			*key = None;
		}
	}

	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.service.log_level.is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
