use std::sync::Arc;

use serde::Serialize;

use crate::{HiveService, Result};
use hive_domain::Document;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
	pub passages: usize,
	pub dimensions: usize,
	pub titles: Vec<String>,
}
impl DocumentSummary {
	fn of(document: &Document) -> Self {
		let mut titles: Vec<String> = Vec::new();

		for passage in document.passages() {
			if !titles.contains(&passage.title) {
				titles.push(passage.title.clone());
			}
		}

		Self { passages: document.len(), dimensions: document.dimensions(), titles }
	}
}

impl HiveService {
	/// Replaces the active document. Flows already in progress keep the snapshot they started with.
	pub fn load_document(&self, document: Document) -> Result<DocumentSummary> {
		if let Some(expected) = self.cfg.providers.embedding.dimensions {
			let expected = expected as usize;

			if document.dimensions() != expected {
				return Err(hive_domain::Error::DimensionMismatch {
					index: 0,
					expected,
					actual: document.dimensions(),
				}
				.into());
			}
		}

		let summary = DocumentSummary::of(&document);
		let mut slot = self.document.write().unwrap_or_else(|err| err.into_inner());

		*slot = Some(Arc::new(document));

		tracing::info!(
			passages = summary.passages,
			dimensions = summary.dimensions,
			"Active document replaced."
		);

		Ok(summary)
	}

	/// Drops the active document. Returns whether one was loaded.
	pub fn clear_document(&self) -> bool {
		let mut slot = self.document.write().unwrap_or_else(|err| err.into_inner());
		let cleared = slot.take().is_some();

		if cleared {
			tracing::info!("Active document cleared.");
		}

		cleared
	}

	pub fn document_summary(&self) -> Option<DocumentSummary> {
		self.active_document().map(|document| DocumentSummary::of(&document))
	}

	pub(crate) fn active_document(&self) -> Option<Arc<Document>> {
		self.document.read().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
