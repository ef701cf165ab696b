//! `GET /store-finder/` and `GET /store-finder/{*path}`.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use storefinder_locator::{resolve, Outcome, PathSlugs, RawParams};

use crate::middleware::RequestId;

use super::{map_locator_error, ApiResponse, AppState, ResponseMeta};

/// `X-Requested-With` value that marks an interactive (JSON payload) caller.
const XHR: &str = "XMLHttpRequest";

pub(super) async fn index(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Query(raw): Query<RawParams>,
) -> Response {
    let outcome = state
        .locator
        .handle(&raw, PathSlugs::default(), is_interactive(&headers))
        .await;
    render(outcome, req_id)
}

pub(super) async fn resolve_path(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Path(path): Path<String>,
    Query(raw): Query<RawParams>,
) -> Response {
    let outcome = resolve(&state.locator, &raw, &path, is_interactive(&headers)).await;
    render(outcome, req_id)
}

fn is_interactive(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case(XHR))
}

fn render(
    outcome: Result<Outcome, storefinder_locator::LocatorError>,
    req_id: RequestId,
) -> Response {
    match outcome {
        Ok(Outcome::Interactive(payload)) => Json(payload).into_response(),
        Ok(Outcome::Page(context)) => Json(ApiResponse {
            data: *context,
            meta: ResponseMeta::new(req_id.0),
        })
        .into_response(),
        Ok(Outcome::Redirect(redirect)) => {
            (StatusCode::FOUND, [(header::LOCATION, redirect.location())]).into_response()
        }
        Err(e) => map_locator_error(req_id.0, &e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn interactive_flag_reads_requested_with_header() {
        let mut headers = HeaderMap::new();
        assert!(!is_interactive(&headers));

        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(is_interactive(&headers));

        headers.insert("x-requested-with", HeaderValue::from_static("xmlhttprequest"));
        assert!(is_interactive(&headers));

        headers.insert("x-requested-with", HeaderValue::from_static("fetch"));
        assert!(!is_interactive(&headers));
    }
}
