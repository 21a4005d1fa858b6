pub mod answer;
pub mod ask;
pub mod search;
pub mod summarize;

mod error;

pub use answer::{AnswerRequest, GenerationResult, NO_RELEVANT_INFORMATION};
pub use ask::{AskRequest, AskResponse};
pub use error::{Error, Result};
pub use search::{SearchRequest, SearchResponse};

use std::sync::Arc;

use govrag_config::Config;
use govrag_providers::{DefaultProviders, GenerationProvider, KnowledgeBaseProvider};

/// Capability clients injected into the service.
pub struct Providers {
	pub knowledge_base: Arc<dyn KnowledgeBaseProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}
impl Providers {
	pub fn new(
		knowledge_base: Arc<dyn KnowledgeBaseProvider>,
		generation: Arc<dyn GenerationProvider>,
	) -> Self {
		Self { knowledge_base, generation }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { knowledge_base: provider.clone(), generation: provider }
	}
}

pub struct GovragService {
	pub cfg: Config,
	pub providers: Providers,
}
impl GovragService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}
