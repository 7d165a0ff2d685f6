//! POST /talk — proxy to the upstream small-talk API.
//!
//! The query is forwarded as a multipart form alongside the configured API
//! key, and the upstream's JSON body is returned to the caller verbatim.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TalkRequest {
    pub query: String,
}

/// Failure modes of the upstream proxy, surfaced as HTTP errors rather than
/// crashing the request task.
#[derive(Debug, thiserror::Error)]
pub enum TalkError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[source] reqwest::Error),

    #[error("upstream returned malformed response: {0}")]
    UpstreamMalformedResponse(#[source] reqwest::Error),
}

impl IntoResponse for TalkError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::BAD_GATEWAY, body).into_response()
    }
}

/// POST /talk
/// Body: {"query": "<text>"}. Response: the upstream JSON body, unmodified.
pub async fn talk(
    State(state): State<AppState>,
    Json(body): Json<TalkRequest>,
) -> Result<Json<Value>, TalkError> {
    let form = reqwest::multipart::Form::new()
        .text("apikey", state.talk_api_key.clone())
        .text("query", body.query);

    let res = state
        .http
        .post(&state.talk_api_url)
        .multipart(form)
        .send()
        .await
        .map_err(TalkError::UpstreamUnavailable)?;

    // The upstream reports its own result codes inside the JSON body, so the
    // body is relayed as-is rather than gated on the HTTP status.
    let res_json = res
        .json::<Value>()
        .await
        .map_err(TalkError::UpstreamMalformedResponse)?;

    Ok(Json(res_json))
}
