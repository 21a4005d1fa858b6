use std::{
	fmt::{Display, Formatter},
	sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;

/// Framework family: `AI-<LETTERS>-<DIGITS>`. The control family shares the shape, so callers
/// must skip matches whose middle segment is `CTRL`.
static FRAMEWORK_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)\bAI-([A-Z]+)-(\d+)\b").expect("Framework identifier pattern must be valid.")
});
static CONTROL_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)\bAI-CTRL-\d+\b").expect("Control identifier pattern must be valid.")
});

const CONTROL_SEGMENT: &str = "CTRL";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Identifier {
	Framework(String),
	Control(String),
}
impl Identifier {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Framework(id) | Self::Control(id) => id.as_str(),
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Self::Framework(_) => "framework",
			Self::Control(_) => "control",
		}
	}
}
impl Display for Identifier {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Pulls the first identifier out of free text.
///
/// Framework identifiers take priority over control identifiers regardless of their position in
/// the text. Matches are normalized to uppercase.
pub fn extract(query: &str) -> Option<Identifier> {
	if let Some(id) = find_framework_id(query) {
		return Some(Identifier::Framework(id));
	}

	CONTROL_ID_RE.find(query).map(|m| Identifier::Control(m.as_str().to_ascii_uppercase()))
}

fn find_framework_id(text: &str) -> Option<String> {
	FRAMEWORK_ID_RE
		.captures_iter(text)
		.find(|caps| !caps[1].eq_ignore_ascii_case(CONTROL_SEGMENT))
		.and_then(|caps| caps.get(0))
		.map(|m| m.as_str().to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
	use super::{Identifier, extract};

	#[test]
	fn extracts_framework_identifier() {
		assert_eq!(
			extract("List controls attached to AI-ADF-013"),
			Some(Identifier::Framework("AI-ADF-013".to_string()))
		);
	}

	#[test]
	fn extracts_control_identifier() {
		assert_eq!(
			extract("What does AI-CTRL-00001 require?"),
			Some(Identifier::Control("AI-CTRL-00001".to_string()))
		);
	}

	#[test]
	fn normalizes_to_uppercase() {
		assert_eq!(
			extract("show ai-adf-024 please").map(|id| id.to_string()),
			Some("AI-ADF-024".to_string())
		);
	}

	#[test]
	fn framework_wins_over_earlier_control() {
		let id =
			extract("Is AI-CTRL-00042 mapped to AI-ADF-016?").expect("Expected an identifier.");

		assert_eq!(id, Identifier::Framework("AI-ADF-016".to_string()));
		assert_eq!(id.kind(), "framework");
	}

	#[test]
	fn plain_queries_have_no_identifier() {
		assert_eq!(extract("What frameworks are available?"), None);
		assert_eq!(extract("Show controls at AI Maturity Level 3"), None);
	}

	#[test]
	fn embedded_tokens_are_not_identifiers() {
		assert_eq!(extract("XAI-ADF-013"), None);
	}
}
