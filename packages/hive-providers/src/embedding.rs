use serde_json::Value;

use crate::{Error, Result};

/// Fetches the embedding for one query: `GET {api_base}{path}?query=<text>`.
pub async fn embed_query(cfg: &hive_config::EmbeddingProviderConfig, query: &str) -> Result<Vec<f32>> {
	let client = crate::client(cfg.timeout_ms)?;
	let res = client
		.get(crate::endpoint(&cfg.api_base, &cfg.path))
		.query(&[("query", query)])
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json)
}

fn parse_embedding_response(json: Value) -> Result<Vec<f32>> {
	let embedding = json
		.get("embedding")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::response("Embedding response is missing embedding array."))?;

	if embedding.is_empty() {
		return Err(Error::response("Embedding array is empty."));
	}

	let mut vec = Vec::with_capacity(embedding.len());

	for value in embedding {
		let number =
			value.as_f64().ok_or_else(|| Error::response("Embedding value must be numeric."))?;

		vec.push(number as f32);
	}

	Ok(vec)
}
