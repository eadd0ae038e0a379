use serde_json::Value;

use crate::{Error, Result};

/// Sends the message history and returns the model's reply text.
///
/// `messages` are OpenAI-style `{ "role", "content" }` objects. In `answer` mode only the last
/// user message is sent, since that endpoint takes a single prompt.
pub async fn complete(cfg: &hive_config::LlmProviderConfig, messages: &[Value]) -> Result<String> {
	match cfg.mode.as_str() {
		"chat" => chat(cfg, messages).await,
		"answer" => {
			let prompt = last_user_content(messages)
				.ok_or_else(|| Error::InvalidConfig {
					message: "Answer mode requires a user message.".to_string(),
				})?;

			answer(cfg, prompt).await
		},
		other => Err(Error::InvalidConfig { message: format!("Unknown LLM mode {other:?}.") }),
	}
}

pub async fn chat(cfg: &hive_config::LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let client = crate::client(cfg.timeout_ms)?;
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_response(&json)
}

/// `GET {api_base}{path}?q=<prompt>`, plain-text reply.
pub async fn answer(cfg: &hive_config::LlmProviderConfig, prompt: &str) -> Result<String> {
	let client = crate::client(cfg.timeout_ms)?;
	let res = client
		.get(crate::endpoint(&cfg.api_base, &cfg.path))
		.query(&[("q", prompt)])
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.send()
		.await?;

	Ok(res.error_for_status()?.text().await?)
}

fn parse_chat_response(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::response("Completion response is missing choices[0].message.content."))
}

fn last_user_content(messages: &[Value]) -> Option<&str> {
	messages
		.iter()
		.rev()
		.find(|message| message.get("role").and_then(|v| v.as_str()) == Some("user"))
		.and_then(|message| message.get("content"))
		.and_then(|content| content.as_str())
}
