use std::{fs, path::Path, sync::Arc};

use color_eyre::eyre::WrapErr;

use hive_domain::{Document, DocumentPayload};
use hive_service::{DocumentSummary, HiveService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<HiveService>,
}
impl AppState {
	pub fn new(config: hive_config::Config) -> Self {
		Self::with_service(HiveService::new(config))
	}

	pub fn with_service(service: HiveService) -> Self {
		Self { service: Arc::new(service) }
	}

	pub fn load_document_file(&self, path: &Path) -> color_eyre::Result<DocumentSummary> {
		let raw = fs::read_to_string(path)
			.wrap_err_with(|| format!("Failed to read document {}.", path.display()))?;
		let payload: DocumentPayload = serde_json::from_str(&raw)
			.wrap_err_with(|| format!("Failed to parse document {}.", path.display()))?;
		let document = Document::from_payload(payload)?;

		Ok(self.service.load_document(document)?)
	}
}
