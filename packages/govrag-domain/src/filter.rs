use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::identifier::Identifier;

pub const FRAMEWORK_ID_KEY: &str = "frameworkId";
pub const FRAMEWORK_IDS_KEY: &str = "frameworkIds";
pub const CONTROL_ID_KEY: &str = "controlId";
pub const CONTROL_IDS_KEY: &str = "controlIds";

/// Boolean expression over passage metadata, in the knowledge base's filter grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetrievalFilter {
	Equals { key: String, value: String },
	ListContains { key: String, value: String },
	OrAll(Vec<RetrievalFilter>),
}
impl RetrievalFilter {
	pub fn equals(key: &str, value: &str) -> Self {
		Self::Equals { key: key.to_string(), value: value.to_string() }
	}

	pub fn list_contains(key: &str, value: &str) -> Self {
		Self::ListContains { key: key.to_string(), value: value.to_string() }
	}

	/// Admits passages that belong to the identifier or list it among their associations.
	pub fn for_identifier(identifier: &Identifier) -> Self {
		match identifier {
			Identifier::Framework(id) => Self::OrAll(vec![
				Self::equals(FRAMEWORK_ID_KEY, id),
				Self::list_contains(FRAMEWORK_IDS_KEY, id),
				Self::list_contains(CONTROL_IDS_KEY, id),
			]),
			Identifier::Control(id) => Self::OrAll(vec![
				Self::equals(CONTROL_ID_KEY, id),
				Self::list_contains(CONTROL_IDS_KEY, id),
			]),
		}
	}

	pub fn to_value(&self) -> Value {
		match self {
			Self::Equals { key, value } => {
				serde_json::json!({ "equals": { "key": key, "value": value } })
			},
			Self::ListContains { key, value } => {
				serde_json::json!({ "listContains": { "key": key, "value": value } })
			},
			Self::OrAll(exprs) => {
				let exprs: Vec<Value> = exprs.iter().map(Self::to_value).collect();

				serde_json::json!({ "orAll": exprs })
			},
		}
	}

	/// Evaluates the filter locally. Returns the drop reason when the metadata is rejected.
	pub fn evaluate(&self, metadata: &Map<String, Value>) -> (bool, Option<String>) {
		match self {
			Self::Equals { key, value } => {
				let matches = metadata.get(key).and_then(Value::as_str) == Some(value.as_str());

				(matches, Some(format!("equals:{key}")).filter(|_| !matches))
			},
			Self::ListContains { key, value } => {
				let matches = metadata
					.get(key)
					.and_then(Value::as_array)
					.is_some_and(|items| {
						items.iter().any(|item| item.as_str() == Some(value.as_str()))
					});

				(matches, Some(format!("listContains:{key}")).filter(|_| !matches))
			},
			Self::OrAll(nodes) => Self::evaluate_or_all(nodes, metadata),
		}
	}

	pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
		self.evaluate(metadata).0
	}

	fn evaluate_or_all(nodes: &[Self], metadata: &Map<String, Value>) -> (bool, Option<String>) {
		let mut first_reason = None;

		for node in nodes {
			let (passed, reason) = node.evaluate(metadata);

			if passed {
				return (true, None);
			}
			if first_reason.is_none() {
				first_reason = reason;
			}
		}

		(false, first_reason.or_else(|| Some("orAll.no_match".to_string())))
	}
}
impl Serialize for RetrievalFilter {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.to_value().serialize(serializer)
	}
}

/// A filter exists if and only if an identifier was extracted.
pub fn build(identifier: Option<&Identifier>) -> Option<RetrievalFilter> {
	identifier.map(RetrievalFilter::for_identifier)
}
