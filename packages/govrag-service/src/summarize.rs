use crate::{Error, GovragService, Result};
use govrag_domain::redaction;
use govrag_providers::GenerationRequest;

const SUMMARY_SYSTEM_PROMPT: &str = "\
You compress one governance document into a digest that answers the user's question.
Rules:
- Keep only facts needed to answer the question. Drop unrelated sections entirely.
- Never write internal identifiers (framework ids, control ids, inventory ids, issue keys). Refer to each item by its name, title, or purpose instead.
- Copy names, numeric values, and dates exactly as written.
- When the document lists work stories, keep every story together with all of its gaps and sub-tasks.
- Do not add any fact that is not in the document.
- Write plain prose. Do not use headings.";

impl GovragService {
	/// Compresses one oversized passage into a query-focused, identifier-free digest.
	pub async fn summarize(
		&self,
		content: &str,
		query: &str,
		summary_tokens: u32,
	) -> Result<String> {
		if summary_tokens == 0 {
			return Err(Error::InvalidRequest {
				message: "summary_tokens must be greater than zero.".to_string(),
			});
		}

		let request = GenerationRequest {
			system: SUMMARY_SYSTEM_PROMPT.to_string(),
			user: format!("Question: {query}\n\nDocument:\n{content}"),
			temperature: self.cfg.generation.summary_temperature,
			max_tokens: summary_tokens,
		};
		let raw = self
			.providers
			.generation
			.generate(&self.cfg.providers.generation, &request)
			.await
			.map_err(|err| {
				tracing::warn!(error = %err, "Digest generation failed.");

				Error::generation(err)
			})?;
		let digest = redaction::strip_heading_markup(&redaction::redact_identifiers(&raw));

		tracing::info!(
			summary_tokens,
			source_chars = content.len(),
			digest_chars = digest.len(),
			"Document digest completed."
		);

		Ok(digest.trim().to_string())
	}
}
