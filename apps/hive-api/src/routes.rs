use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use hive_domain::{Document, DocumentPayload};
use hive_service::{AskResponse, DocumentSummary};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
	pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
	pub cleared: bool,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/document", get(document_summary).put(load_document).delete(clear_document))
		.route("/v1/ask", post(ask))
		.route("/v1/ask/latest", get(latest))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn load_document(
	State(state): State<AppState>,
	payload: Result<Json<DocumentPayload>, JsonRejection>,
) -> Result<Json<DocumentSummary>, ApiError> {
	let Json(payload) = payload.map_err(ApiError::from_rejection)?;
	let document = Document::from_payload(payload).map_err(|err| {
		json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_DOCUMENT", err.to_string())
	})?;
	let summary = state.service.load_document(document)?;

	Ok(Json(summary))
}

async fn clear_document(State(state): State<AppState>) -> Json<ClearResponse> {
	Json(ClearResponse { cleared: state.service.clear_document() })
}

async fn document_summary(
	State(state): State<AppState>,
) -> Result<Json<DocumentSummary>, ApiError> {
	state.service.document_summary().map(Json).ok_or_else(|| {
		json_error(StatusCode::NOT_FOUND, "NO_DOCUMENT", "No document is loaded.")
	})
}

// Question failures are part of the response body; only malformed requests are HTTP errors.
async fn ask(
	State(state): State<AppState>,
	payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
	let Json(payload) = payload.map_err(ApiError::from_rejection)?;
	let response = state.service.ask(payload.query).await;

	Ok(Json(response))
}

async fn latest(State(state): State<AppState>) -> Result<Json<AskResponse>, ApiError> {
	state.service.latest().map(Json).ok_or_else(|| {
		json_error(StatusCode::NOT_FOUND, "NO_RESULT", "No question has finished yet.")
	})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}

	fn from_rejection(rejection: JsonRejection) -> Self {
		Self::new(rejection.status(), "INVALID_REQUEST", rejection.body_text())
	}
}

impl From<hive_service::Error> for ApiError {
	fn from(err: hive_service::Error) -> Self {
		let status = match err.kind() {
			hive_service::FailureKind::InvalidDocument | hive_service::FailureKind::InvalidQuery =>
				StatusCode::UNPROCESSABLE_ENTITY,
			hive_service::FailureKind::NoDocument => StatusCode::NOT_FOUND,
			_ => StatusCode::BAD_GATEWAY,
		};

		json_error(status, err.kind().as_str().to_ascii_uppercase(), err.to_string())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: impl Into<String>,
	message: impl Into<String>,
) -> ApiError {
	ApiError::new(status, code, message)
}
