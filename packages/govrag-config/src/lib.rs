mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Eval, Generation, KnowledgeBaseConfig, LlmProviderConfig, Providers, Search, Service,
};

use std::{env, fs, path::Path};

use serde_json::{Map, Value};

pub fn load(path: &Path) -> Result<Config> {
	let mut cfg = read(path)?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Loads the optional config file, then layers process environment variables on top.
pub fn load_env(path: Option<&Path>) -> Result<Config> {
	load_with(path, |key| env::var(key).ok())
}

/// Loads the optional config file, then layers values from `lookup` on top.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let mut cfg = match path {
		Some(path) => read(path)?,
		None => Config::default(),
	};

	apply_env_overrides(&mut cfg, lookup);
	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Overwrites config fields with non-empty values from the lookup.
pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	let get = |key: &str| {
		lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
	};

	if let Some(value) = get("KNOWLEDGE_BASE_ID") {
		cfg.knowledge_base.knowledge_base_id = value;
	}
	if let Some(value) = get("REGION") {
		cfg.knowledge_base.region = value;
	}
	if let Some(value) = get("KNOWLEDGE_BASE_API_BASE") {
		cfg.knowledge_base.api_base = value;
	}
	if let Some(value) = get("KNOWLEDGE_BASE_API_KEY") {
		cfg.knowledge_base.api_key = value;
	}
	if let Some(value) = get("OPENAI_API_KEY") {
		cfg.providers.generation.api_key = value;
	}
	if let Some(value) = get("OPENAI_MODEL") {
		cfg.providers.generation.model = value;
	}
	if let Some(value) = get("OPENAI_API_BASE") {
		cfg.providers.generation.api_base = value;
	}
	if let Some(value) = get("GOVRAG_LOG_LEVEL") {
		cfg.service.log_level = value;
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.knowledge_base.knowledge_base_id.trim().is_empty() {
		return Err(Error::Validation {
			message: "knowledge_base.knowledge_base_id must be non-empty.".to_string(),
		});
	}
	if cfg.knowledge_base.region.trim().is_empty() {
		return Err(Error::Validation {
			message: "knowledge_base.region must be non-empty.".to_string(),
		});
	}
	if cfg.knowledge_base.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "knowledge_base.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_headers("knowledge_base.default_headers", &cfg.knowledge_base.default_headers)?;

	let generation = &cfg.providers.generation;

	if generation.provider_id.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.generation.provider_id must be non-empty.".to_string(),
		});
	}
	if generation.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.generation.api_key must be non-empty.".to_string(),
		});
	}
	if generation.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.generation.model must be non-empty.".to_string(),
		});
	}
	if generation.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.generation.api_base must be non-empty.".to_string(),
		});
	}
	if generation.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.generation.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_headers("providers.generation.default_headers", &generation.default_headers)?;
	validate_temperature("generation.summary_temperature", cfg.generation.summary_temperature)?;
	validate_temperature("generation.answer_temperature", cfg.generation.answer_temperature)?;

	if cfg.search.top_k == 0 {
		return Err(Error::Validation {
			message: "search.top_k must be greater than zero.".to_string(),
		});
	}
	if !matches!(cfg.search.search_mode.as_str(), "hybrid" | "semantic") {
		return Err(Error::Validation {
			message: "search.search_mode must be one of hybrid or semantic.".to_string(),
		});
	}
	if cfg.eval.top_k == 0 {
		return Err(Error::Validation {
			message: "eval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.eval.output.trim().is_empty() {
		return Err(Error::Validation { message: "eval.output must be non-empty.".to_string() });
	}

	Ok(())
}

fn validate_temperature(field: &str, value: f32) -> Result<()> {
	if !value.is_finite() {
		return Err(Error::Validation { message: format!("{field} must be a finite number.") });
	}
	if !(0.0..=2.0).contains(&value) {
		return Err(Error::Validation {
			message: format!("{field} must be in the range 0.0-2.0."),
		});
	}

	Ok(())
}

fn validate_headers(field: &str, headers: &Map<String, Value>) -> Result<()> {
	for (key, value) in headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("{field}.{key} must be a string."),
			});
		}
	}

	Ok(())
}

fn read(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	toml::from_str(&raw).map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })
}

fn normalize(cfg: &mut Config) {
	cfg.knowledge_base.region = cfg.knowledge_base.region.trim().to_string();

	if cfg.knowledge_base.api_base.trim().is_empty() {
		cfg.knowledge_base.api_base =
			format!("https://bedrock-agent-runtime.{}.amazonaws.com", cfg.knowledge_base.region);
	}

	cfg.knowledge_base.api_base = cfg.knowledge_base.api_base.trim_end_matches('/').to_string();
	cfg.providers.generation.api_base =
		cfg.providers.generation.api_base.trim_end_matches('/').to_string();
}
