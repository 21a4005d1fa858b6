use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	#[serde(default)]
	pub knowledge_base: KnowledgeBaseConfig,
	#[serde(default)]
	pub providers: Providers,
	#[serde(default)]
	pub generation: Generation,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub eval: Eval,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

/// Connection settings for the managed knowledge base that owns the vector index.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
	pub knowledge_base_id: String,
	pub region: String,
	/// Empty means "derive from region".
	pub api_base: String,
	pub api_key: String,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}
impl Default for KnowledgeBaseConfig {
	fn default() -> Self {
		Self {
			knowledge_base_id: String::new(),
			region: "us-east-1".to_string(),
			api_base: String::new(),
			api_key: String::new(),
			timeout_ms: 30_000,
			default_headers: Map::new(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Providers {
	#[serde(default)]
	pub generation: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}
impl Default for LlmProviderConfig {
	fn default() -> Self {
		Self {
			provider_id: "openai".to_string(),
			api_base: "https://api.openai.com".to_string(),
			api_key: String::new(),
			path: "/v1/chat/completions".to_string(),
			model: "gpt-4o".to_string(),
			timeout_ms: 60_000,
			default_headers: Map::new(),
		}
	}
}

/// Sampling temperatures for the two generation call sites.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Generation {
	pub summary_temperature: f32,
	pub answer_temperature: f32,
}
impl Default for Generation {
	fn default() -> Self {
		Self { summary_temperature: 0.0, answer_temperature: 0.2 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub top_k: u32,
	/// One of `hybrid` or `semantic`.
	pub search_mode: String,
	/// When false, queries are never narrowed to an extracted identifier.
	pub identifier_filter: bool,
	pub preview_chars: usize,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			top_k: 5,
			search_mode: "hybrid".to_string(),
			identifier_filter: true,
			preview_chars: 500,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Eval {
	pub top_k: u32,
	pub output: String,
}
impl Default for Eval {
	fn default() -> Self {
		Self { top_k: 10, output: "eval_results.json".to_string() }
	}
}
