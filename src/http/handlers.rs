use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::rpc::server::{ResponseHeaders, Transport};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Collects the server's emission and turns it into an HTTP 200 response.
#[derive(Debug, Default)]
pub struct HttpTransport {
    emitted: Option<(String, ResponseHeaders)>,
}

impl Transport for HttpTransport {
    fn send(&mut self, body: String, headers: ResponseHeaders) {
        self.emitted = Some((body, headers));
    }
}

impl IntoResponse for HttpTransport {
    fn into_response(self) -> Response {
        let Some((body, headers)) = self.emitted else {
            tracing::error!("rpc server finished without emitting a response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, headers.content_type.to_string()),
                (header::LAST_MODIFIED, headers.last_modified),
            ],
            body,
        )
            .into_response()
    }
}

pub async fn rpc_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    let mut transport = HttpTransport::default();
    state.server.process(&body, &mut transport).await;
    transport.into_response()
}
