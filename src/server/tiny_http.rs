//! `tiny_http` server adapter
//!
//! Handles routing, body parsing, and response conversion for `tiny_http`.
//! Requests are served one at a time; concurrent dispatcher runs from other
//! processes are kept apart by the queue store's lock.

use std::io::{Cursor, Read as _};

use log::{info, warn};
use serde::{Serialize, de::DeserializeOwned};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use vistoria::api::{
    self, ApiError, ApiResponse, EnqueueEventRequest, RetryExportRequest, TestWebhookRequest,
};
use vistoria::workspace::Workspace;

type JsonResponse = Response<Cursor<Vec<u8>>>;

/// Serve the API until the process is stopped
pub fn serve(ws: &Workspace, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let server = Server::http(&addr).map_err(|e| anyhow::anyhow!("Failed to start server: {e}"))?;
    info!("Listening on http://{addr}");

    for mut request in server.incoming_requests() {
        let response = handle_api_request(ws, &mut request);
        info!("{} {} -> {}", request.method(), request.url(), response.status_code().0);
        if let Err(e) = request.respond(response) {
            warn!("Failed to send response: {e}");
        }
    }

    Ok(())
}

// =============================================================================
// REQUEST HANDLING
// =============================================================================

/// Handle an API request and return a response
pub fn handle_api_request(ws: &Workspace, request: &mut Request) -> JsonResponse {
    let method = request.method().clone();
    let path = request.url().split('?').next().unwrap_or_default().to_string();

    let body = if method == Method::Post {
        match read_body(request) {
            Ok(body) => body,
            Err(e) => return error_response(&e),
        }
    } else {
        String::new()
    };

    route(ws, &method, &path, &body)
}

/// Map a method and path to an API handler
fn route(ws: &Workspace, method: &Method, path: &str, body: &str) -> JsonResponse {
    let api_path = path.strip_prefix("/api").unwrap_or(path);
    let api_path = api_path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(api_path);

    match (method, api_path) {
        (&Method::Get, "/webhook-config") => handle_result(api::get_webhook_config(ws)),

        // POST /webhook-config - test delivery
        (&Method::Post, "/webhook-config") => match parse_json::<TestWebhookRequest>(body) {
            Ok(req) => handle_outcome(api::test_webhook(ws, req)),
            Err(e) => error_response(&e),
        },

        (&Method::Post, "/process-webhook-queue") => handle_result(api::process_webhook_queue(ws)),

        (&Method::Post, "/retry-export") => match parse_json::<RetryExportRequest>(body) {
            Ok(req) => handle_outcome(api::retry_export(ws, req)),
            Err(e) => error_response(&e),
        },

        (&Method::Post, "/events") => match parse_json::<EnqueueEventRequest>(body) {
            Ok(req) => handle_result(api::enqueue_event(ws, req)),
            Err(e) => error_response(&e),
        },

        // Report validation: GET /inspections/{id}/validation
        _ if *method == Method::Get
            && api_path.starts_with("/inspections/")
            && api_path.ends_with("/validation") =>
        {
            let id = api_path
                .strip_prefix("/inspections/")
                .and_then(|s| s.strip_suffix("/validation"))
                .unwrap_or("");
            if id.is_empty() || id.contains('/') {
                not_found_response("Not found")
            } else {
                handle_result(api::validate_report(ws, id))
            }
        },

        _ => not_found_response("Not found"),
    }
}

// =============================================================================
// BODY PARSING
// =============================================================================

fn read_body(request: &mut Request) -> Result<String, ApiError> {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .map_err(|e| ApiError::bad_request(format!("Failed to read request body: {e}")))?;
    Ok(body)
}

/// Parse a JSON body; an empty body is read as `{}`
fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    Ok(serde_json::from_str(body)?)
}

// =============================================================================
// RESPONSE HELPERS
// =============================================================================

fn handle_result<T: Serialize>(result: Result<T, ApiError>) -> JsonResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_response(&e),
    }
}

/// Delivery and retry outcomes already carry `success`
fn handle_outcome<T: Serialize>(result: Result<T, ApiError>) -> JsonResponse {
    match result {
        Ok(outcome) => json_response(&outcome, 200),
        Err(e) => error_response(&e),
    }
}

fn success_response<T: Serialize>(data: T) -> JsonResponse {
    let response = ApiResponse::success(data);
    json_response(&response, 200)
}

fn error_response(error: &ApiError) -> JsonResponse {
    let response = ApiResponse::<()>::from(error);
    json_response(&response, error.status_code())
}

fn not_found_response(message: &str) -> JsonResponse {
    let response = ApiResponse::<()>::error("NOT_FOUND", message);
    json_response(&response, 404)
}

fn json_response<T: Serialize>(data: &T, status: u16) -> JsonResponse {
    let json = serde_json::to_string(data).unwrap_or_else(|_| r#"{"success":false}"#.to_string());
    let response = Response::from_data(json.into_bytes()).with_status_code(StatusCode(status));
    match Header::from_bytes("Content-Type", "application/json") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
