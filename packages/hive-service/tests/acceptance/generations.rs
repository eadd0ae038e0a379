use std::time::Duration;

use hive_service::Outcome;
use hive_testkit::{ScriptedCompletion, Step};

fn keyed() -> ScriptedCompletion {
	ScriptedCompletion::default()
		.with_rule("INITIAL_QUERY: bees", Step::delayed(hive_testkit::agent_reply("@answer: slow"), 200))
		.with_rule("INITIAL_QUERY: ants", Step::reply(hive_testkit::agent_reply("@answer: fast")))
}

#[tokio::test]
async fn stale_flow_does_not_publish() {
	let (service, _, _) = crate::acceptance::service(keyed());
	let mut older = service.begin("bees");
	let mut newer = service.begin("ants");

	assert!(newer.generation > older.generation);
	assert_eq!(service.current_generation(), newer.generation);

	let newer_response = service.drive(&mut newer).await;
	let older_response = service.drive(&mut older).await;

	assert_eq!(newer_response.answer(), Some("fast"));
	assert_eq!(older_response.outcome, Outcome::Superseded { latest_generation: newer.generation });
	assert!(older_response.results.is_empty());

	let latest = service.latest().expect("Newest result must be published.");

	assert_eq!(latest.generation, newer.generation);
	assert_eq!(latest.answer(), Some("fast"));
}

#[tokio::test]
async fn concurrent_questions_keep_newest_answer() {
	let (service, _, _) = crate::acceptance::service(keyed());
	let slow = tokio::spawn({
		let service = service.clone();

		async move { service.ask("bees").await }
	});

	tokio::time::sleep(Duration::from_millis(20)).await;

	let fast = service.ask("ants").await;
	let slow = slow.await.expect("Slow question task panicked.");

	assert_eq!(fast.answer(), Some("fast"));
	assert!(matches!(slow.outcome, Outcome::Superseded { .. }), "Unexpected: {:?}", slow.outcome);
	assert_eq!(service.latest().and_then(|latest| latest.answer().map(str::to_string)), Some("fast".to_string()));
}

#[tokio::test]
async fn flow_keeps_document_snapshot() {
	let (service, _, _) = crate::acceptance::service(keyed());
	let mut flow = service.begin("ants");

	assert!(service.clear_document());

	let response = service.drive(&mut flow).await;

	assert_eq!(response.answer(), Some("fast"));
	assert_eq!(response.results.len(), 3);

	let after = service.ask("ants").await;

	crate::acceptance::assert_failure(&after, hive_service::FailureKind::NoDocument);
}

#[tokio::test]
async fn starting_a_question_keeps_previous_result_visible() {
	let (service, _, _) = crate::acceptance::service(keyed());
	let first = service.ask("ants").await;
	let mut pending = service.begin("bees");

	assert!(pending.generation > first.generation);

	let shown = service.latest().expect("Finished result must stay visible.");

	assert_eq!(shown.generation, first.generation);
	assert_eq!(shown.answer(), Some("fast"));

	let response = service.drive(&mut pending).await;

	assert_eq!(response.answer(), Some("slow"));
	assert_eq!(service.latest().map(|latest| latest.generation), Some(pending.generation));
}

#[tokio::test]
async fn blank_query_does_not_supersede_running_question() {
	let (service, _, completion) = crate::acceptance::service(keyed());
	let mut running = service.begin("ants");
	let blank = service.ask("   ").await;

	crate::acceptance::assert_failure(&blank, hive_service::FailureKind::InvalidQuery);
	assert_eq!(service.current_generation(), running.generation);
	assert!(service.latest().is_none());

	let response = service.drive(&mut running).await;

	assert_eq!(response.answer(), Some("fast"));
	assert_eq!(completion.call_count(), 1);
	assert_eq!(service.latest().map(|latest| latest.generation), Some(running.generation));
}
