//! Response conversion.
//!
//! # Responsibilities
//! - Turn a transport-neutral `MockResponse` into an HTTP response
//! - Set the content type chosen by the dispatch engine
//!
//! # Design Decisions
//! - Body bytes are passed through untouched

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::dispatch::MockResponse;

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Outcome, CONTENT_TYPE_TEXT};

    #[tokio::test]
    async fn test_into_response() {
        let res = MockResponse {
            status: 418,
            content_type: CONTENT_TYPE_TEXT,
            body: b"short and stout".to_vec(),
            outcome: Outcome::Matched,
        }
        .into_response();

        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(res.headers()[header::CONTENT_TYPE], CONTENT_TYPE_TEXT);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"short and stout");
    }
}
