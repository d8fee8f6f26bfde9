use axum::{
	Json, Router,
	extract::{Path, State, WebSocketUpgrade},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use scout_domain::{eligibility::Eligibility, profile::ProjectProfile};
use scout_service::{Error, RankedResponse, SearchRequest, SearchTarget, TurnRequest, TurnResponse};

use crate::{state::AppState, ws};

#[derive(Debug, Deserialize)]
pub struct MessageBody {
	pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
	pub conversation_id: String,
	pub profile: ProjectProfile,
	pub completeness: f32,
	pub eligibility: Eligibility,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidInput { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message, None),
			Error::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			Error::OracleUnavailable { message } | Error::OracleParse { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "ORACLE_ERROR", message, None),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage failure while serving request.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", message, None)
			},
			Error::Delivery { message } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "DELIVERY_ERROR", message, None),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/conversations/{conversation_id}/messages", post(post_message))
		.route("/v1/conversations/{conversation_id}/profile", get(get_profile))
		.route("/v1/conversations/{conversation_id}/ws", get(subscribe))
		.route("/v1/search/investors", post(search_investors))
		.route("/v1/search/companies", post(search_companies))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn post_message(
	State(state): State<AppState>,
	Path(conversation_id): Path<String>,
	Json(payload): Json<MessageBody>,
) -> Result<Json<TurnResponse>, ApiError> {
	let _turn = state.lock_turn(&conversation_id).await;
	let response =
		state.scout.handle_turn(TurnRequest { conversation_id, message: payload.message }).await?;

	Ok(Json(response))
}

async fn get_profile(
	State(state): State<AppState>,
	Path(conversation_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
	let Some(profile) = state.scout.stores.profiles.load_profile(&conversation_id).await? else {
		return Err(Error::NotFound {
			message: format!("No profile for conversation {conversation_id}."),
		}
		.into());
	};
	let eligibility = state.scout.can_search(&profile);

	Ok(Json(ProfileView {
		conversation_id,
		completeness: profile.completeness(),
		profile,
		eligibility,
	}))
}

async fn search_investors(
	State(state): State<AppState>,
	Json(mut payload): Json<SearchRequest>,
) -> Json<RankedResponse> {
	payload.target = SearchTarget::Investors;

	Json(state.scout.search(payload).await)
}

async fn search_companies(
	State(state): State<AppState>,
	Json(mut payload): Json<SearchRequest>,
) -> Json<RankedResponse> {
	payload.target = SearchTarget::Companies;

	Json(state.scout.search(payload).await)
}

async fn subscribe(
	State(state): State<AppState>,
	Path(conversation_id): Path<String>,
	upgrade: WebSocketUpgrade,
) -> Response {
	upgrade.on_upgrade(move |socket| ws::handle_socket(state, conversation_id, socket))
}
