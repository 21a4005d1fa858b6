use serde::Serialize;

/// Token caps for the two generation call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TokenBudget {
	pub summary_tokens: u32,
	pub answer_tokens: u32,
}
impl TokenBudget {
	pub const fn new(summary_tokens: u32, answer_tokens: u32) -> Self {
		Self { summary_tokens, answer_tokens }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentDepth {
	/// Single-field lookups.
	Narrow,
	/// Listing and summary questions.
	Medium,
	/// Design, cost and architecture questions.
	Deep,
}

pub struct BudgetRule {
	pub depth: IntentDepth,
	pub keywords: &'static [&'static str],
	pub budget: TokenBudget,
}

/// Ordered from narrow to deep. When a query matches several rules, the last matching rule wins.
pub const BUDGET_RULES: [BudgetRule; 3] = [
	BudgetRule {
		depth: IntentDepth::Narrow,
		keywords: &[
			"overall risk",
			"risk level",
			"risk rating",
			"owner",
			"status",
			"category",
			"who is",
			"when was",
			"what is the id",
		],
		budget: TokenBudget::new(400, 600),
	},
	BudgetRule {
		depth: IntentDepth::Medium,
		keywords: &["list", "summary", "summarize", "overview", "show", "which", "controls"],
		budget: TokenBudget::new(800, 1_500),
	},
	BudgetRule {
		depth: IntentDepth::Deep,
		keywords: &[
			"design document",
			"architecture",
			"tco",
			"total cost",
			"cost",
			"rollout",
			"jira",
			"stories",
			"bill of material",
			"describe",
			"explain",
			"full",
			"everything",
		],
		budget: TokenBudget::new(2_500, 4_000),
	},
];

pub const DEFAULT_BUDGET: TokenBudget = TokenBudget::new(1_000, 2_000);

/// Substrings that route a query through the single-document digest path.
pub const LARGE_DOCUMENT_KEYWORDS: &[&str] = &[
	"use case",
	"use-case",
	"usecase",
	"assessment",
	"model name",
	"design document",
	"tco",
	"total cost of ownership",
	"rollout",
	"jira stories",
	"bill of material",
	"risk and controls",
	"risk & controls",
	"epics",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Intent {
	pub budget: TokenBudget,
	/// The rule that decided the budget, if any matched.
	pub depth: Option<IntentDepth>,
	pub large_document: bool,
}

pub fn classify(query: &str) -> Intent {
	let (budget, depth) = classify_budget(query);

	Intent { budget, depth, large_document: is_large_document_query(query) }
}

pub fn classify_budget(query: &str) -> (TokenBudget, Option<IntentDepth>) {
	let query = query.to_lowercase();

	BUDGET_RULES
		.iter()
		.rev()
		.find(|rule| rule.keywords.iter().any(|keyword| contains_phrase(&query, keyword)))
		.map(|rule| (rule.budget, Some(rule.depth)))
		.unwrap_or((DEFAULT_BUDGET, None))
}

pub fn is_large_document_query(query: &str) -> bool {
	let query = query.to_lowercase();

	LARGE_DOCUMENT_KEYWORDS.iter().any(|keyword| query.contains(keyword))
}

// Keyword must sit on word boundaries so `tco` does not fire inside `outcome`.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
	haystack.match_indices(phrase).any(|(start, matched)| {
		let end = start + matched.len();
		let before = haystack[..start].chars().next_back();
		let after = haystack[end..].chars().next();

		!before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
	})
}

#[cfg(test)]
mod tests {
	use super::{DEFAULT_BUDGET, IntentDepth, TokenBudget, classify, classify_budget};

	#[test]
	fn narrow_lookup_gets_smaller_budget_than_deep_question() {
		let (narrow, narrow_depth) = classify_budget("What is the overall risk?");
		let (deep, deep_depth) = classify_budget("Describe the full design document and TCO");

		assert_eq!(narrow_depth, Some(IntentDepth::Narrow));
		assert_eq!(deep_depth, Some(IntentDepth::Deep));
		assert!(narrow.summary_tokens < deep.summary_tokens);
		assert!(narrow.answer_tokens < deep.answer_tokens);
	}

	#[test]
	fn deepest_matching_rule_wins() {
		let (budget, depth) = classify_budget("Who is the owner and what is the total cost?");

		assert_eq!(depth, Some(IntentDepth::Deep));
		assert_eq!(budget, TokenBudget::new(2_500, 4_000));
	}

	#[test]
	fn unmatched_query_uses_default_budget() {
		assert_eq!(classify_budget("Hello there"), (DEFAULT_BUDGET, None));
	}

	#[test]
	fn keywords_respect_word_boundaries() {
		assert_eq!(classify_budget("Expected outcome").1, None);
	}

	#[test]
	fn large_document_mode_is_case_insensitive() {
		assert!(classify("Give me the Use Case ASSESSMENT for fraud scoring").large_document);
		assert!(classify("What are the Jira Stories?").large_document);
		assert!(!classify("What frameworks are available?").large_document);
	}
}
