pub mod filter;
pub mod identifier;
pub mod intent;
pub mod redaction;

pub use filter::RetrievalFilter;
pub use identifier::Identifier;
pub use intent::{Intent, IntentDepth, TokenBudget};
