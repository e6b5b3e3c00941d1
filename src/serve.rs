//! HTTP server for the browser front end
//!
//! `voicecmd serve` → starts server, serves the command manager page and a
//! small JSON API over the store

use crate::error::StoreError;
use crate::store::{CommandStore, CommandSummary};
use colored::Colorize;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{info, warn};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Body of `POST /api/commands`, as JSON or a urlencoded form
#[derive(Deserialize, Debug, Default)]
struct CreateCommandRequest {
    #[serde(default)]
    phrase: String,
    #[serde(default)]
    action: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    aliases: String,
}

#[derive(Serialize)]
struct CreatedCommand {
    id: String,
    phrase: String,
}

#[derive(Serialize)]
struct CommandContent {
    id: String,
    content: String,
}

#[derive(Serialize)]
struct DeletedCommand {
    id: String,
}

// Embedded command manager page
const MANAGER_HTML: &str = include_str!("manager.html");

const JSON: &str = "application/json";
const HTML: &str = "text/html; charset=utf-8";

/// A response ready to be sent
#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, payload: &ApiResponse<T>) -> std::io::Result<Self> {
        Ok(Self {
            status,
            content_type: JSON,
            body: serde_json::to_string(payload)?,
        })
    }

    fn error(err: &StoreError) -> std::io::Result<Self> {
        Self::json(err.status_code(), &ApiResponse::<()>::failure(err.to_string()))
    }
}

/// Start the command manager server
pub fn start_server(store: CommandStore, host: &str, port: u16) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let server = Server::http(&addr).map_err(|e| std::io::Error::other(e.to_string()))?;

    let url = format!("http://{}:{}", host, port);

    eprintln!("\n{}", "Voice Command Manager".bold().green());
    eprintln!("   Open: {}", url);
    eprintln!("   Commands: {}", store.root().display());
    eprintln!("   Press Ctrl+C to stop\n");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(&store, request) {
            warn!(error = %e, "failed to answer request");
        }
    }

    Ok(())
}

fn handle_request(store: &CommandStore, mut request: Request) -> std::io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/").to_string();
    let method = request.method().clone();
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let mut body = String::new();
    let reply = if method == Method::Post {
        match request.as_reader().read_to_string(&mut body) {
            Ok(_) => route(store, &method, &path, content_type.as_deref(), &body)?,
            Err(e) => Reply::json(
                400,
                &ApiResponse::<()>::failure(format!("Failed to read body: {}", e)),
            )?,
        }
    } else {
        route(store, &method, &path, None, "")?
    };

    info!(method = %method, path = %path, status = reply.status, "request");

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    request.respond(response)
}

fn route(
    store: &CommandStore,
    method: &Method,
    path: &str,
    content_type: Option<&str>,
    body: &str,
) -> std::io::Result<Reply> {
    if let Some(segment) = path.strip_prefix("/api/commands/") {
        // The page sends ids through encodeURIComponent
        let id = match percent_decode_str(segment).decode_utf8() {
            Ok(id) => id,
            Err(_) => return Reply::error(&StoreError::NotFound(segment.to_string())),
        };
        let id: &str = &id;
        return match method {
            Method::Get => match store.read(id) {
                Ok(content) => Reply::json(
                    200,
                    &ApiResponse::success(CommandContent {
                        id: id.to_string(),
                        content,
                    }),
                ),
                Err(e) => Reply::error(&e),
            },
            Method::Delete => match store.delete(id) {
                Ok(()) => Reply::json(200, &ApiResponse::success(DeletedCommand { id: id.to_string() })),
                Err(e) => Reply::error(&e),
            },
            _ => not_found(),
        };
    }

    match (method, path) {
        (Method::Get, "/") => Ok(Reply {
            status: 200,
            content_type: HTML,
            body: MANAGER_HTML.to_string(),
        }),

        (Method::Get, "/api/commands") => match store.list() {
            Ok(commands) => Reply::json(200, &ApiResponse::<Vec<CommandSummary>>::success(commands)),
            Err(e) => Reply::error(&e),
        },

        (Method::Post, "/api/commands") => {
            let req = match parse_create_body(content_type, body) {
                Ok(req) => req,
                Err(msg) => return Reply::json(400, &ApiResponse::<()>::failure(msg)),
            };
            match store.create(&req.phrase, &req.action, &req.description, &req.aliases) {
                Ok(id) => Reply::json(
                    201,
                    &ApiResponse::success(CreatedCommand {
                        id,
                        phrase: req.phrase.trim().to_string(),
                    }),
                ),
                Err(e) => Reply::error(&e),
            }
        }

        _ => not_found(),
    }
}

fn not_found() -> std::io::Result<Reply> {
    Reply::json(404, &ApiResponse::<()>::failure("Not found"))
}

fn parse_create_body(content_type: Option<&str>, body: &str) -> Result<CreateCommandRequest, String> {
    let is_form =
        content_type.is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        serde_urlencoded::from_str(body).map_err(|e| format!("Invalid form body: {}", e))
    } else {
        serde_json::from_str(body).map_err(|e| format!("Invalid JSON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, CommandStore) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = CommandStore::open(dir.path()).expect("Failed to open store");
        (dir, store)
    }

    fn call(store: &CommandStore, method: Method, path: &str, body: &str) -> (u16, Value) {
        let reply = route(store, &method, path, Some(JSON), body).unwrap();
        assert_eq!(reply.content_type, JSON);
        (reply.status, serde_json::from_str(&reply.body).unwrap())
    }

    // === ApiResponse Tests ===

    #[test]
    fn test_api_response_success() {
        let response: ApiResponse<String> = ApiResponse::success("hello".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("hello".to_string()));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_api_response_failure_serializes_to_json() {
        let response = ApiResponse::<()>::failure("boom");
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"ok\":false"));
        assert!(json.contains("\"data\":null"));
        assert!(json.contains("\"error\":\"boom\""));
    }

    // === Page ===

    #[test]
    fn test_index_serves_manager_page() {
        let (_dir, store) = temp_store();
        let reply = route(&store, &Method::Get, "/", None, "").unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, HTML);
        assert!(reply.body.contains("<!DOCTYPE html>"));
        assert!(reply.body.contains("</html>"));
        assert!(reply.body.contains("/api/commands"));
    }

    // === API ===

    #[test]
    fn test_list_empty() {
        let (_dir, store) = temp_store();
        let (status, json) = call(&store, Method::Get, "/api/commands", "");
        assert_eq!(status, 200);
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"], Value::Array(vec![]));
    }

    #[test]
    fn test_create_list_show_delete() {
        let (_dir, store) = temp_store();

        let body = r#"{"phrase": "ready now", "action": "echo hi", "description": "d", "aliases": "a, b"}"#;
        let (status, json) = call(&store, Method::Post, "/api/commands", body);
        assert_eq!(status, 201);
        assert_eq!(json["data"]["id"], "ready-now");
        assert_eq!(json["data"]["phrase"], "ready now");

        let (status, json) = call(&store, Method::Get, "/api/commands", "");
        assert_eq!(status, 200);
        assert_eq!(json["data"][0]["id"], "ready-now");
        assert_eq!(json["data"][0]["phrase"], "ready now");
        assert_eq!(json["data"][0]["description"], "d");

        let (status, json) = call(&store, Method::Get, "/api/commands/ready-now", "");
        assert_eq!(status, 200);
        let content = json["data"]["content"].as_str().unwrap();
        assert!(content.contains("aliases: [\"ready now\", \"a\", \"b\"]"));

        let (status, json) = call(&store, Method::Delete, "/api/commands/ready-now", "");
        assert_eq!(status, 200);
        assert_eq!(json["data"]["id"], "ready-now");

        let (status, json) = call(&store, Method::Delete, "/api/commands/ready-now", "");
        assert_eq!(status, 404);
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().contains("ready-now"));
    }

    #[test]
    fn test_create_from_form_body() {
        let (_dir, store) = temp_store();
        let reply = route(
            &store,
            &Method::Post,
            "/api/commands",
            Some("application/x-www-form-urlencoded"),
            "phrase=check+it&action=cargo%20test&aliases=verify%2C+test+ready",
        )
        .unwrap();
        assert_eq!(reply.status, 201);

        let commands = store.list().unwrap();
        assert_eq!(commands[0].id, "check-it");
        assert_eq!(commands[0].aliases, vec!["verify", "test ready"]);
        assert!(store.read("check-it").unwrap().ends_with("\n\ncargo test\n"));
    }

    #[test]
    fn test_create_validation_error() {
        let (_dir, store) = temp_store();
        let (status, json) = call(&store, Method::Post, "/api/commands", r#"{"phrase": "x"}"#);
        assert_eq!(status, 400);
        assert_eq!(json["error"], "action is required");
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_create_invalid_json() {
        let (_dir, store) = temp_store();
        let (status, json) = call(&store, Method::Post, "/api/commands", "{not json");
        assert_eq!(status, 400);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[test]
    fn test_show_missing() {
        let (_dir, store) = temp_store();
        let (status, json) = call(&store, Method::Get, "/api/commands/nope", "");
        assert_eq!(status, 404);
        assert_eq!(json["ok"], false);
    }

    #[test]
    fn test_encoded_id_segment() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path_for("café-time"), "make coffee\n").unwrap();
        assert_eq!(store.list().unwrap()[0].id, "café-time");

        let (status, json) = call(&store, Method::Get, "/api/commands/caf%C3%A9-time", "");
        assert_eq!(status, 200);
        assert_eq!(json["data"]["id"], "café-time");
        assert_eq!(json["data"]["content"], "make coffee\n");

        let (status, json) = call(&store, Method::Delete, "/api/commands/caf%C3%A9-time", "");
        assert_eq!(status, 200);
        assert_eq!(json["data"]["id"], "café-time");
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_encoded_separator_cannot_escape_root() {
        let (_dir, store) = temp_store();
        let (status, _) = call(&store, Method::Get, "/api/commands/..%2Fsecret", "");
        assert_eq!(status, 404);
        let (status, _) = call(&store, Method::Get, "/api/commands/%FF", "");
        assert_eq!(status, 404);
    }

    #[test]
    fn test_unknown_routes() {
        let (_dir, store) = temp_store();
        assert_eq!(call(&store, Method::Get, "/api/nothing", "").0, 404);
        assert_eq!(call(&store, Method::Put, "/api/commands/x", "").0, 404);
        assert_eq!(call(&store, Method::Delete, "/api/commands", "").0, 404);
    }
}
