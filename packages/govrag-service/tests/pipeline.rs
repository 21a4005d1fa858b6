use std::sync::Arc;

use regex::Regex;

use govrag_domain::{Identifier, redaction};
use govrag_service::{
	AskRequest, Error, GovragService, NO_RELEVANT_INFORMATION, Providers, SearchRequest,
};
use govrag_testkit::{FailingProvider, FakeKnowledgeBase, SpyGeneration};

fn service_with(kb: &FakeKnowledgeBase, generation: &SpyGeneration) -> GovragService {
	GovragService::with_providers(
		govrag_testkit::test_config(),
		Providers::new(Arc::new(kb.clone()), Arc::new(generation.clone())),
	)
}

fn ask(query: &str) -> AskRequest {
	AskRequest { query: query.to_string(), ..Default::default() }
}

#[tokio::test]
async fn framework_query_only_sees_its_own_sources() {
	let kb = FakeKnowledgeBase::with_fixtures();
	let generation = SpyGeneration::fixed("Two controls apply.");
	let service = service_with(&kb, &generation);
	let response = service
		.ask(AskRequest {
			query: "List controls attached to AI-ADF-013".to_string(),
			top_k: Some(10),
			..Default::default()
		})
		.await
		.expect("Ask failed.");

	assert_eq!(response.identifier, Some(Identifier::Framework("AI-ADF-013".to_string())));
	assert!(response.filter_applied);
	assert!(!response.passages.is_empty());

	for passage in &response.passages {
		assert!(passage.source.contains("AI-ADF-013"), "Leaked source {}", passage.source);

		for other in ["AI-ADF-024", "AI-ADF-016", "AI-ADF-015", "AI-ADF-018", "AI-ADF-023"] {
			assert!(!passage.source.contains(other));
		}
	}

	assert!(response.result.source_match);

	let request = &kb.requests()[0];

	assert_eq!(request.top_k, 10);
	assert_eq!(request.search_mode, govrag_providers::SearchMode::Hybrid);
	assert!(request.filter.is_some());
}

#[tokio::test]
async fn plain_query_runs_unfiltered_and_matches_vacuously() {
	let kb = FakeKnowledgeBase::with_fixtures();
	let generation = SpyGeneration::fixed("Several frameworks exist.");
	let service = service_with(&kb, &generation);
	let response = service.ask(ask("What frameworks are available?")).await.expect("Ask failed.");

	assert_eq!(response.identifier, None);
	assert!(!response.filter_applied);
	assert!(kb.requests()[0].filter.is_none());
	assert!(response.result.source_match);
	assert_eq!(response.passages.len(), 5);
	assert_eq!(response.result.chunks_used, 5);
}

#[tokio::test]
async fn empty_retrieval_short_circuits_generation() {
	let kb = FakeKnowledgeBase::with_fixtures();
	let generation = SpyGeneration::fixed("Should never be produced.");
	let service = service_with(&kb, &generation);
	let response = service.ask(ask("Summarize AI-ADF-099")).await.expect("Ask failed.");

	assert!(response.filter_applied);
	assert_eq!(response.result.answer, NO_RELEVANT_INFORMATION);
	assert_eq!(response.result.chunks_used, 0);
	assert!(response.result.sources_used.is_empty());
	assert!(!response.large_document);
	assert_eq!(generation.calls(), 0);
}

#[tokio::test]
async fn large_document_query_answers_from_a_digest_of_the_top_passage() {
	let kb = FakeKnowledgeBase::with_fixtures();
	let generation = SpyGeneration::echo();
	let service = service_with(&kb, &generation);
	let response = service
		.ask(ask("Give me the use case assessment for AI-ADF-013"))
		.await
		.expect("Ask failed.");
	let requests = generation.requests();

	assert!(response.large_document);
	assert_eq!(generation.calls(), 2);
	assert_eq!(requests[0].temperature, 0.0);
	assert_eq!(requests[0].max_tokens, response.budget.summary_tokens);
	assert!((requests[1].temperature - 0.2).abs() < f32::EPSILON);
	assert_eq!(requests[1].max_tokens, response.budget.answer_tokens);
	assert!(requests[1].user.contains("[Source: s3://govrag-kb/framework-controls/AI-ADF-013.md]"));
	assert!(!requests[1].user.contains("---"));
	assert_eq!(response.result.chunks_used, 1);
	assert_eq!(response.result.sources_used.len(), 1);
	assert_eq!(response.result.retrieval_scores.len(), response.passages.len());
	assert!(!redaction::contains_raw_identifier(&response.result.answer));
}

#[tokio::test]
async fn digest_never_contains_raw_identifiers_or_headings() {
	let kb = FakeKnowledgeBase::default();
	let generation = SpyGeneration::echo();
	let service = service_with(&kb, &generation);
	let digest = service
		.summarize(
			"# Framework AI-ADF-013\nControl AI-CTRL-00001 applies. Budget: $120,000 by 2025-03-01.",
			"What does the framework require?",
			500,
		)
		.await
		.expect("Summarize failed.");

	assert!(!redaction::contains_raw_identifier(&digest));
	assert!(!digest.lines().any(|line| line.starts_with('#')));
	assert!(digest.contains("the referenced control applies"));
	assert!(digest.contains("$120,000 by 2025-03-01"));
}

#[tokio::test]
async fn rendered_answers_are_redacted() {
	let kb = FakeKnowledgeBase::with_fixtures();
	let generation = SpyGeneration::fixed("AI-ADF-013 maps to AI-CTRL-00001 and AI-CTRL-00002.");
	let service = service_with(&kb, &generation);
	let response =
		service.ask(ask("List controls attached to AI-ADF-013")).await.expect("Ask failed.");

	assert_eq!(
		response.result.answer,
		"the referenced framework maps to the referenced control and the referenced control."
	);
}

#[tokio::test]
async fn identifiers_glued_to_word_characters_are_redacted() {
	let raw_pattern = Regex::new(r"AI-[A-Z]+-\d+").expect("Pattern must be valid.");
	let kb = FakeKnowledgeBase::with_fixtures();

	for raw in [
		"See _AI-ADF-013_ now.",
		"The AI-ADF-013s controls",
		"AI-CTRL-00001a",
		"snake_AI-ADF-024",
		"## AI-ADF-016:\n**AI-CTRL-00003**",
	] {
		let generation = SpyGeneration::fixed(raw);
		let service = service_with(&kb, &generation);
		let response =
			service.ask(ask("List controls attached to AI-ADF-013")).await.expect("Ask failed.");

		assert!(!raw_pattern.is_match(&response.result.answer), "Answer leaked {raw:?}");

		let digest = service
			.summarize("Framework AI-ADF-013 text.", "Summarize the design document.", 500)
			.await
			.expect("Summarize failed.");

		assert!(!raw_pattern.is_match(&digest), "Digest leaked {raw:?}");
	}
}

#[tokio::test]
async fn retriever_keeps_service_order() {
	let kb = FakeKnowledgeBase::new(vec![
		govrag_testkit::passage("b.md", 0.2, serde_json::json!({}), "low first"),
		govrag_testkit::passage("a.md", 0.9, serde_json::json!({}), "high second"),
	]);
	let generation = SpyGeneration::fixed("unused");
	let service = service_with(&kb, &generation);
	let passages = service.retrieve("anything", 5, None).await.expect("Retrieve failed.");

	assert_eq!(passages[0].content, "low first");
	assert_eq!(passages[1].content, "high second");
}

#[tokio::test]
async fn disabled_identifier_filter_sends_no_filter() {
	let kb = FakeKnowledgeBase::with_fixtures();
	let generation = SpyGeneration::fixed("unused");
	let service = service_with(&kb, &generation);
	let response = service
		.search(SearchRequest {
			query: "List controls attached to AI-ADF-013".to_string(),
			top_k: Some(10),
			identifier_filter: Some(false),
		})
		.await
		.expect("Search failed.");

	assert!(response.identifier.is_some());
	assert!(response.filter.is_none());
	assert!(response.passages.iter().any(|passage| passage.source.contains("AI-ADF-024")));
}

#[tokio::test]
async fn empty_query_is_rejected_before_retrieval() {
	let kb = FakeKnowledgeBase::with_fixtures();
	let generation = SpyGeneration::fixed("unused");
	let service = service_with(&kb, &generation);
	let err = service.ask(ask("   ")).await.expect_err("Expected rejection.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert_eq!(kb.calls(), 0);
}

#[tokio::test]
async fn provider_failures_surface_as_typed_errors() {
	let failing = Arc::new(FailingProvider::new("quota exceeded"));
	let service = GovragService::with_providers(
		govrag_testkit::test_config(),
		Providers::new(failing.clone(), Arc::new(SpyGeneration::fixed("unused"))),
	);
	let err =
		service.ask(ask("What frameworks are available?")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Retrieval { ref message } if message == "quota exceeded"));

	let service = GovragService::with_providers(
		govrag_testkit::test_config(),
		Providers::new(Arc::new(FakeKnowledgeBase::with_fixtures()), failing),
	);
	let err =
		service.ask(ask("What frameworks are available?")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Generation { ref message } if message == "quota exceeded"));
}
