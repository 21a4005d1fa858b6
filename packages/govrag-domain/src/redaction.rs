use std::sync::LazyLock;

use regex::Regex;

pub const CONTROL_PLACEHOLDER: &str = "the referenced control";
pub const FRAMEWORK_PLACEHOLDER: &str = "the referenced framework";

// No word boundaries: identifiers glued to markup or suffixes must match too.
static RAW_CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)AI-CTRL-\d+").expect("Raw control pattern must be valid.")
});
static RAW_IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)AI-[A-Z]+-\d+").expect("Raw identifier pattern must be valid.")
});

/// Replaces every raw identifier with a descriptive placeholder, including identifiers that touch
/// surrounding word characters (`_AI-ADF-013_`, `AI-ADF-013s`).
pub fn redact_identifiers(text: &str) -> String {
	let text = RAW_CONTROL_RE.replace_all(text, CONTROL_PLACEHOLDER);

	RAW_IDENTIFIER_RE.replace_all(&text, FRAMEWORK_PLACEHOLDER).into_owned()
}

pub fn contains_raw_identifier(text: &str) -> bool {
	RAW_IDENTIFIER_RE.is_match(text)
}

/// Drops markdown heading prefixes so digests read as plain prose. A `#` run only marks a
/// heading when whitespace or the end of the line follows it.
pub fn strip_heading_markup(text: &str) -> String {
	text.lines()
		.map(|line| {
			let trimmed = line.trim_start();
			let rest = trimmed.trim_start_matches('#');
			let is_heading = rest.len() < trimmed.len()
				&& (rest.is_empty() || rest.starts_with(char::is_whitespace));

			if is_heading {
				rest.trim_start()
			} else {
				line
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// The single contamination predicate: ASCII case-insensitive substring match.
pub fn mentions_identifier(text: &str, identifier: &str) -> bool {
	if identifier.is_empty() {
		return false;
	}

	text.to_ascii_lowercase().contains(&identifier.to_ascii_lowercase())
}
