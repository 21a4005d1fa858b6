use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};
use govrag_config::LlmProviderConfig;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationRequest {
	pub system: String,
	pub user: String,
	pub temperature: f32,
	pub max_tokens: u32,
}

pub async fn generate(cfg: &LlmProviderConfig, request: &GenerationRequest) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = request_body(cfg, request);

	tracing::debug!(
		provider_id = %cfg.provider_id,
		model = %cfg.model,
		max_tokens = request.max_tokens,
		"Requesting generation."
	);

	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_response(json)
}

fn request_body(cfg: &LlmProviderConfig, request: &GenerationRequest) -> Value {
	serde_json::json!({
		"model": cfg.model,
		"temperature": request.temperature,
		"max_tokens": request.max_tokens,
		"messages": [
			{ "role": "system", "content": request.system },
			{ "role": "user", "content": request.user },
		],
	})
}

fn parse_chat_response(json: Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::trim)
		.filter(|content| !content.is_empty())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Generation response is missing message content.".to_string(),
		})?;

	Ok(content.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "role": "assistant", "content": "  Grounded answer.\n" } },
				{ "message": { "role": "assistant", "content": "Ignored." } }
			]
		});

		assert_eq!(parse_chat_response(json).expect("parse failed"), "Grounded answer.");
	}

	#[test]
	fn blank_content_is_invalid() {
		let json = serde_json::json!({ "choices": [{ "message": { "content": "   " } }] });

		assert!(matches!(parse_chat_response(json), Err(Error::InvalidResponse { .. })));
	}

	#[test]
	fn body_carries_token_cap_and_both_messages() {
		let cfg = LlmProviderConfig { model: "gpt-4o-mini".to_string(), ..Default::default() };
		let request = GenerationRequest {
			system: "Answer from context only.".to_string(),
			user: "Question: What is the overall risk?".to_string(),
			temperature: 0.2,
			max_tokens: 600,
		};
		let body = request_body(&cfg, &request);

		assert_eq!(body["model"], "gpt-4o-mini");
		assert_eq!(body["max_tokens"], 600);
		assert_eq!(body["messages"][0]["role"], "system");
		assert_eq!(body["messages"][1]["content"], "Question: What is the overall risk?");
	}
}
