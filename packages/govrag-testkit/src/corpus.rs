use serde_json::{Map, Value};

use govrag_providers::Passage;

const BUCKET: &str = "s3://govrag-kb";

pub fn passage(path: &str, score: f32, metadata: Value, content: &str) -> Passage {
	Passage {
		content: content.to_string(),
		score,
		source: format!("{BUCKET}/{path}"),
		metadata: metadata.as_object().cloned().unwrap_or_else(Map::new),
	}
}

/// A small governance knowledge base, ranked by descending score.
///
/// Framework lookups with filtering enabled only ever see their own documents. Without
/// filtering, the higher-ranked documents of other frameworks leak into results.
pub fn fixture_passages() -> Vec<Passage> {
	vec![
		passage(
			"frameworks/AI-ADF-024.md",
			0.93,
			serde_json::json!({ "frameworkId": "AI-ADF-024" }),
			"# Framework AI-ADF-024\nName: Model Risk Framework\nOwner: Enterprise Risk\nOverall risk: Medium\nTarget maturity: Level 3",
		),
		passage(
			"framework-controls/AI-ADF-013.md",
			0.91,
			serde_json::json!({
				"frameworkId": "AI-ADF-013",
				"controlIds": ["AI-CTRL-00001", "AI-CTRL-00002"],
			}),
			"# Framework Controls for AI-ADF-013\nResponsible AI Framework\n- AI-CTRL-00001 Data lineage (Level 2)\n- AI-CTRL-00002 Human oversight (Level 3)",
		),
		passage(
			"frameworks/AI-ADF-013.md",
			0.88,
			serde_json::json!({ "frameworkId": "AI-ADF-013" }),
			"# Framework AI-ADF-013\nName: Responsible AI Framework\nOwner: Model Governance Office\nOverall risk: High",
		),
		passage(
			"framework-controls/AI-ADF-016.md",
			0.86,
			serde_json::json!({
				"frameworkId": "AI-ADF-016",
				"controlIds": ["AI-CTRL-00003"],
			}),
			"# Framework Controls for AI-ADF-016\nGenerative AI Framework\n- AI-CTRL-00003 Bias testing (Level 3)",
		),
		passage(
			"controls/AI-CTRL-00003.md",
			0.84,
			serde_json::json!({ "controlId": "AI-CTRL-00003" }),
			"# Control AI-CTRL-00003\nName: Bias testing\nAI Maturity Level 3\nEvidence: quarterly fairness report",
		),
		passage(
			"frameworks/AI-ADF-015.md",
			0.81,
			serde_json::json!({ "frameworkId": "AI-ADF-015" }),
			"# Framework AI-ADF-015\nName: Third-Party AI Framework\nOwner: Procurement",
		),
		passage(
			"frameworks/AI-ADF-016.md",
			0.79,
			serde_json::json!({ "frameworkId": "AI-ADF-016" }),
			"# Framework AI-ADF-016\nName: Generative AI Framework\nOwner: AI Platform",
		),
		passage(
			"assessments/AI-ADF-013/fraud-scoring.md",
			0.74,
			serde_json::json!({ "frameworkIds": ["AI-ADF-013"] }),
			"# Use Case Assessment: Fraud Scoring\nModel name: Fraud Scorer v2\nTCO: $120,000 per year\nRollout: 2025-03-01\nJira stories:\n- FRAUD-101 Feature store migration. Gaps: lineage capture, access review\n- FRAUD-102 Shadow deployment. Gaps: rollback runbook",
		),
		passage(
			"controls/AI-CTRL-00001.md",
			0.70,
			serde_json::json!({ "controlId": "AI-CTRL-00001" }),
			"# Control AI-CTRL-00001\nName: Data lineage\nAI Maturity Level 2",
		),
		passage(
			"framework-controls/AI-ADF-024.md",
			0.66,
			serde_json::json!({
				"frameworkId": "AI-ADF-024",
				"controlIds": ["AI-CTRL-00001"],
			}),
			"# Framework Controls for AI-ADF-024\nModel Risk Framework\n- AI-CTRL-00001 Data lineage (Level 2)",
		),
		passage(
			"frameworks/AI-ADF-018.md",
			0.60,
			serde_json::json!({ "frameworkId": "AI-ADF-018" }),
			"# Framework AI-ADF-018\nName: Vendor Model Framework",
		),
		passage(
			"frameworks/AI-ADF-023.md",
			0.55,
			serde_json::json!({ "frameworkId": "AI-ADF-023" }),
			"# Framework AI-ADF-023\nName: Edge AI Framework",
		),
	]
}
