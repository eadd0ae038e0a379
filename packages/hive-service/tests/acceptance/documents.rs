use hive_domain::Document;
use hive_service::FailureKind;
use hive_testkit::ScriptedCompletion;

#[test]
fn summarizes_and_clears_document() {
	let (service, _, _) = crate::acceptance::service(ScriptedCompletion::default());
	let summary = service.document_summary().expect("Document must be loaded.");

	assert_eq!(summary.passages, 4);
	assert_eq!(summary.dimensions, 2);
	assert_eq!(summary.titles, vec!["Insects".to_string()]);
	assert!(service.clear_document());
	assert!(!service.clear_document());
	assert!(service.document_summary().is_none());
}

#[test]
fn replacing_document_updates_summary() {
	let (service, _, _) = crate::acceptance::service(ScriptedCompletion::default());
	let replacement = Document::new(vec![
		hive_testkit::passage("Birds", "Crows", &[1.0, 0.0]),
		hive_testkit::passage("Fish", "Carp", &[0.0, 1.0]),
	])
	.expect("Replacement document must be valid.");
	let summary = service.load_document(replacement).expect("Failed to replace document.");

	assert_eq!(summary.passages, 2);
	assert_eq!(summary.titles, vec!["Birds".to_string(), "Fish".to_string()]);
}

#[test]
fn rejects_document_with_unexpected_dimensions() {
	let mut cfg = hive_testkit::test_config();

	cfg.providers.embedding.dimensions = Some(3);

	let (service, _, _) = crate::acceptance::build(
		cfg,
		crate::acceptance::embedding(),
		ScriptedCompletion::default(),
		false,
	);
	let err = service
		.load_document(crate::acceptance::insects())
		.expect_err("Expected a dimension mismatch.");

	assert_eq!(err.kind(), FailureKind::InvalidDocument);
	assert!(service.document_summary().is_none());
}
