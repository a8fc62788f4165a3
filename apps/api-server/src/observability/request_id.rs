//! Request ID propagation.
//!
//! Reuses the caller's `X-Request-ID` when it looks sane, otherwise mints a
//! UUID. The id is attached to a tracing span around the request, is readable
//! through [`current_request_id`] while the request is served, and is echoed
//! back in the response headers.

use actix_web::Error;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// The id of the request currently being served, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}

fn incoming_request_id(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(String::from)
}

pub async fn propagate_request_id(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let request_id = incoming_request_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut res = REQUEST_ID
        .scope(request_id.clone(), next.call(req))
        .instrument(span)
        .await?;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        res.headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use actix_web::middleware::from_fn;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;
    use crate::middleware::error::AppError;

    #[actix_rt::test]
    async fn test_echoes_supplied_request_id() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(propagate_request_id))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("X-Request-ID", "abc-123"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.headers().get(REQUEST_ID_HEADER).unwrap(), "abc-123");
    }

    #[actix_rt::test]
    async fn test_generates_request_id_when_missing() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(propagate_request_id))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        let id = res.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[actix_rt::test]
    async fn test_problem_details_carry_the_request_id() {
        let app = test::init_service(
            App::new().wrap(from_fn(propagate_request_id)).route(
                "/",
                web::get().to(|| async {
                    Err::<HttpResponse, _>(AppError::NotFound("Post 1 not found".to_string()))
                }),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("X-Request-ID", "abc-123"))
            .to_request();
        let problem: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(problem["status"], 404);
        assert_eq!(problem["request_id"], "abc-123");
        assert!(current_request_id().is_none());
    }
}
