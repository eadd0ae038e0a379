use hive_service::{FailureKind, FlowState};
use hive_testkit::{ScriptedCompletion, Step};

fn hop(heading: &str, hop: u32) -> (String, u32) {
	(heading.to_string(), hop)
}

#[tokio::test]
async fn answers_on_first_hop() {
	let (service, embedding, completion) = crate::acceptance::service(ScriptedCompletion::new([
		Step::reply(hive_testkit::agent_reply("@answer: 42")),
	]));
	let mut flow = service.begin("bees");
	let response = service.drive(&mut flow).await;

	assert_eq!(response.answer(), Some("42"));
	assert_eq!(response.hops, 0);
	assert_eq!(embedding.calls(), vec!["bees".to_string()]);
	assert_eq!(
		crate::acceptance::headings(&response),
		vec![hop("Wasps", 0), hop("Hornets", 0), hop("Ants", 0)]
	);

	let histories = completion.histories();

	assert_eq!(histories.len(), 1);
	assert_eq!(histories[0].len(), 2);
	assert_eq!(histories[0][0]["role"], "system");
	assert_eq!(histories[0][1]["role"], "user");

	let prompt = histories[0][1]["content"].as_str().expect("Prompt must be text.");

	assert!(prompt.starts_with("INITIAL_QUERY: bees\n\nOUTPUT:\n\nNotes on Wasps."));
	assert!(prompt.contains("Action: <action>"));
	assert!(!prompt.contains("Notes on Beetles."));

	assert!(flow.conversation().is_fresh());
	assert_eq!(flow.state(), FlowState::Idle);
	assert_eq!(service.latest().and_then(|latest| latest.answer().map(str::to_string)), Some("42".to_string()));
}

#[tokio::test]
async fn searches_again_then_answers() {
	let (service, embedding, completion) = crate::acceptance::service(ScriptedCompletion::new([
		Step::reply(hive_testkit::agent_reply("@search: ants")),
		Step::reply(hive_testkit::agent_reply("@answer: Both sting.")),
	]));
	let response = service.ask("bees").await;

	assert_eq!(response.answer(), Some("Both sting."));
	assert_eq!(response.hops, 1);
	assert_eq!(embedding.calls(), vec!["bees".to_string(), "ants".to_string()]);
	assert_eq!(
		crate::acceptance::headings(&response),
		vec![
			hop("Wasps", 0),
			hop("Hornets", 0),
			hop("Ants", 0),
			hop("Ants", 1),
			hop("Hornets", 1),
			hop("Wasps", 1),
		]
	);

	let histories = completion.histories();

	assert_eq!(histories.len(), 2);

	let roles: Vec<&str> =
		histories[1].iter().filter_map(|message| message["role"].as_str()).collect();

	assert_eq!(roles, vec!["system", "user", "assistant", "user"]);

	let follow_up = histories[1][3]["content"].as_str().expect("Prompt must be text.");

	assert!(follow_up.starts_with("Now, here is the output of the 2nd search."));
	assert!(follow_up.contains("Please take the answer action, no need of further search."));
	assert!(follow_up.contains("Notes on Ants.\n\nNotes on Hornets.\n\nNotes on Wasps."));
}

#[tokio::test]
async fn terminates_after_second_reply_when_it_searches_again() {
	let (service, embedding, completion) = crate::acceptance::service(ScriptedCompletion::new([
		Step::reply(hive_testkit::agent_reply("@search: ants")),
		Step::reply(hive_testkit::agent_reply("@search: bees")),
		Step::reply(hive_testkit::agent_reply("@answer: never sent")),
	]));
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::HopBudgetExhausted);
	assert_eq!(embedding.call_count(), 2);
	assert_eq!(completion.call_count(), 2);
}

#[tokio::test]
async fn terminates_after_second_reply_when_it_is_unparseable() {
	let (service, embedding, completion) = crate::acceptance::service(ScriptedCompletion::new([
		Step::reply(hive_testkit::agent_reply("@search: ants")),
		Step::reply("I am not sure."),
	]));
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::UnparseableAction);
	assert_eq!(embedding.call_count(), 2);
	assert_eq!(completion.call_count(), 2);
	assert_eq!(response.results.len(), 6);
}

#[tokio::test]
async fn larger_hop_budget_allows_more_searches() {
	let mut cfg = hive_testkit::test_config();

	cfg.retrieval.max_hops = 2;

	let (service, embedding, completion) = crate::acceptance::build(
		cfg,
		crate::acceptance::embedding(),
		ScriptedCompletion::new([
			Step::reply(hive_testkit::agent_reply("@search: ants")),
			Step::reply(hive_testkit::agent_reply("@search: bees")),
			Step::reply(hive_testkit::agent_reply("@answer: done")),
		]),
		true,
	);
	let response = service.ask("bees").await;

	assert_eq!(response.answer(), Some("done"));
	assert_eq!(response.hops, 2);
	assert_eq!(embedding.call_count(), 3);
	assert_eq!(response.results.len(), 9);

	let histories = completion.histories();
	let second = histories[1].last().and_then(|message| message["content"].as_str()).unwrap_or("");
	let third = histories[2].last().and_then(|message| message["content"].as_str()).unwrap_or("");

	assert!(second.contains("otherwise take another search action"));
	assert!(third.starts_with("Now, here is the output of the 3rd search."));
	assert!(third.contains("Please take the answer action"));
	assert_eq!(histories[2].len(), 6);
}

#[tokio::test]
async fn zero_hop_budget_rejects_search() {
	let mut cfg = hive_testkit::test_config();

	cfg.retrieval.max_hops = 0;

	let (service, embedding, _) = crate::acceptance::build(
		cfg,
		crate::acceptance::embedding(),
		ScriptedCompletion::new([Step::reply(hive_testkit::agent_reply("@search: ants"))]),
		true,
	);
	let response = service.ask("bees").await;

	crate::acceptance::assert_failure(&response, FailureKind::HopBudgetExhausted);
	assert_eq!(embedding.call_count(), 1);
}

#[tokio::test]
async fn top_k_controls_result_count() {
	let mut cfg = hive_testkit::test_config();

	cfg.retrieval.top_k = 1;

	let (service, _, completion) = crate::acceptance::build(
		cfg,
		crate::acceptance::embedding(),
		ScriptedCompletion::new([Step::reply(hive_testkit::agent_reply("@answer: ok"))]),
		true,
	);
	let response = service.ask("ants").await;

	assert_eq!(crate::acceptance::headings(&response), vec![hop("Ants", 0)]);

	let prompt = completion.histories()[0][1]["content"].as_str().unwrap_or("").to_string();

	assert!(prompt.contains("OUTPUT:\n\nNotes on Ants.\n\n===="));
}
