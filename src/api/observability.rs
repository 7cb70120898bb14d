use crate::api::{ApiError, AppState, Caller};
use crate::domain::permissions::{Action, Resource, authorize};
use axum::{
    Extension,
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span, info, info_span};
use uuid::Uuid;

/// `GET /system/metrics`, admin only.
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(caller.actor(), Resource::System, Action::Read, None).check()?;

    Ok(state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    ))
}

const ANONYMOUS: &str = "anonymous";

fn outcome(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "denied",
        s if s.is_server_error() => "error",
        s if s.is_client_error() => "client_error",
        _ => "success",
    }
}

/// Role of the caller the auth layer resolved, if the request got that far.
fn caller_role(response: &Response) -> &'static str {
    response
        .extensions()
        .get::<Caller>()
        .and_then(Caller::actor)
        .map_or(ANONYMOUS, |actor| actor.role.as_str())
}

/// One span and one wide event per request, plus the HTTP metrics.
///
/// The caller's id and role are known only after the auth layer ran, so
/// they are read back from the response.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    // Matched route keeps metric label cardinality bounded.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_owned(), |mp| mp.as_str().to_owned());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %path,
        route = %route,
        user_id = tracing::field::Empty,
        role = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let status = response.status();
        let role = caller_role(&response);
        let current = Span::current();
        current.record("role", role);
        if let Some(actor) = response.extensions().get::<Caller>().and_then(Caller::actor) {
            current.record("user_id", actor.id.value());
        }

        let labels = [
            ("method", method.to_string()),
            ("path", route.clone()),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        let outcome = outcome(status);
        if outcome == "denied" {
            metrics::counter!("http_requests_denied_total", "path" => route, "role" => role)
                .increment(1);
        }

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            status_code = status.as_u16(),
            outcome,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
    // JSON only: nothing may be loaded or framed.
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
];

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Actor, Role, UserId};

    #[test]
    fn test_outcome_separates_denials() {
        assert_eq!(outcome(StatusCode::OK), "success");
        assert_eq!(outcome(StatusCode::NOT_FOUND), "client_error");
        assert_eq!(outcome(StatusCode::FORBIDDEN), "denied");
        assert_eq!(outcome(StatusCode::UNAUTHORIZED), "denied");
        assert_eq!(outcome(StatusCode::SERVICE_UNAVAILABLE), "error");
    }

    #[test]
    fn test_caller_role_from_response() {
        let mut response = StatusCode::OK.into_response();
        assert_eq!(caller_role(&response), ANONYMOUS);

        response.extensions_mut().insert(Caller(Some(Actor {
            id: UserId::new(3),
            username: "mod".to_string(),
            role: Role::Moderator,
            is_staff: false,
            is_superuser: false,
        })));
        assert_eq!(caller_role(&response), "moderator");
    }
}
