use hive_service::{FailureKind, Outcome};
use hive_testkit::{ScriptedCompletion, ScriptedEmbedding, Step};

fn answer_once() -> ScriptedCompletion {
	ScriptedCompletion::new([Step::reply(hive_testkit::agent_reply("@answer: unused"))])
}

#[tokio::test]
async fn unparseable_first_reply_ends_flow() {
	let (service, embedding, completion) =
		crate::acceptance::service(ScriptedCompletion::new([Step::reply(
			"Observation: read it.\nAction: @answer: 42",
		)]));
	let mut flow = service.begin("bees");
	let response = service.drive(&mut flow).await;

	crate::acceptance::assert_failure(&response, FailureKind::UnparseableAction);
	assert!(
		matches!(&response.outcome, Outcome::NoAnswer { message, .. } if message.contains("no Thought section")),
		"Unexpected: {:?}",
		response.outcome
	);
	assert_eq!(embedding.call_count(), 1);
	assert_eq!(completion.call_count(), 1);
	assert_eq!(response.results.len(), 3);
	assert!(flow.conversation().is_fresh());
	assert_eq!(
		service.latest().and_then(|latest| latest.failure()),
		Some(FailureKind::UnparseableAction)
	);
}

#[tokio::test]
async fn embedding_network_failure_skips_model() {
	let (service, _, completion) = crate::acceptance::build(
		hive_testkit::test_config(),
		ScriptedEmbedding::new().with_network_failure("bees"),
		answer_once(),
		true,
	);
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::Network);
	assert_eq!(completion.call_count(), 0);
	assert!(response.results.is_empty());
}

#[tokio::test]
async fn malformed_embedding_is_reported() {
	let (service, _, completion) = crate::acceptance::build(
		hive_testkit::test_config(),
		ScriptedEmbedding::new().with_malformed_response("bees"),
		answer_once(),
		true,
	);
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::MalformedEmbedding);
	assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn embedding_dimension_mismatch_is_malformed() {
	let (service, _, completion) = crate::acceptance::build(
		hive_testkit::test_config(),
		ScriptedEmbedding::new().with_vector("bees", vec![1.0, 0.0, 0.0]),
		answer_once(),
		true,
	);
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::MalformedEmbedding);
	assert_eq!(completion.call_count(), 0);

	let empty = crate::acceptance::build(
		hive_testkit::test_config(),
		ScriptedEmbedding::new().with_vector("bees", Vec::new()),
		answer_once(),
		true,
	)
	.0
	.ask("bees")
	.await;

	crate::acceptance::assert_failure(&empty, FailureKind::MalformedEmbedding);
}

#[tokio::test]
async fn completion_failure_is_network_failure() {
	let (service, _, _) =
		crate::acceptance::service(ScriptedCompletion::new([Step::fail("HTTP 503 from upstream.")]));
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::Network);
	assert_eq!(response.results.len(), 3);
}

#[tokio::test]
async fn second_hop_embedding_failure_ends_flow() {
	let (service, embedding, completion) = crate::acceptance::build(
		hive_testkit::test_config(),
		crate::acceptance::embedding().with_network_failure("wasps"),
		ScriptedCompletion::new([
			Step::reply(hive_testkit::agent_reply("@search: wasps")),
			Step::reply(hive_testkit::agent_reply("@answer: unused")),
		]),
		true,
	);
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::Network);
	assert_eq!(embedding.call_count(), 2);
	assert_eq!(completion.call_count(), 1);
	assert_eq!(response.hops, 1);
}

#[tokio::test]
async fn slow_model_times_out() {
	let mut cfg = hive_testkit::test_config();

	cfg.providers.llm.timeout_ms = 20;

	let (service, _, _) = crate::acceptance::build(
		cfg,
		crate::acceptance::embedding(),
		ScriptedCompletion::new([Step::delayed(hive_testkit::agent_reply("@answer: late"), 500)]),
		true,
	);
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::Network);

	match &response.outcome {
		hive_service::Outcome::NoAnswer { message, .. } =>
			assert!(message.contains("timed out after 20 ms"), "Unexpected message: {message}"),
		other => panic!("Unexpected outcome: {other:?}"),
	}
}

#[tokio::test]
async fn missing_document_fails_without_provider_calls() {
	let (service, embedding, completion) = crate::acceptance::build(
		hive_testkit::test_config(),
		crate::acceptance::embedding(),
		answer_once(),
		false,
	);
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::NoDocument);
	assert_eq!(embedding.call_count(), 0);
	assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn blank_query_fails_without_provider_calls() {
	let (service, embedding, completion) = crate::acceptance::service(answer_once());
	let response = service.ask(" \n\t").await;

	crate::acceptance::assert_failure(&response, FailureKind::InvalidQuery);
	assert_eq!(embedding.call_count(), 0);
	assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn slow_embedding_times_out() {
	let mut cfg = hive_testkit::test_config();

	cfg.providers.embedding.timeout_ms = 20;

	let (service, _, completion) = crate::acceptance::build(
		cfg,
		ScriptedEmbedding::new()
			.with_fallback(crate::acceptance::BEES.to_vec())
			.with_delay(std::time::Duration::from_millis(500)),
		answer_once(),
		true,
	);
	let response = service.ask("anything").await;

	crate::acceptance::assert_failure(&response, FailureKind::Network);
	assert_eq!(completion.call_count(), 0);
}
