//! Unauthenticated endpoints
//!
//! - GET /              - Static banner
//! - GET /hello         - `{"Hello":"World!"}`
//! - GET /hello/{name}  - Greeting
//! - GET /ws            - Websocket that answers each text frame reversed

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path,
    },
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use unicode_segmentation::UnicodeSegmentation;

use crate::api::middleware::AppState;

const BANNER: &str = "Postboard: a simple posts and tags API with register, token and logout routes\n";

/// Build public router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/hello", get(hello))
        .route("/hello/{name}", get(hello_name))
        .route("/ws", get(websocket))
}

pub async fn index() -> &'static str {
    BANNER
}

pub async fn hello() -> Json<Value> {
    Json(json!({ "Hello": "World!" }))
}

pub async fn hello_name(Path(name): Path<String>) -> String {
    format!("Hello, {}!", name)
}

/// GET /ws
pub async fn websocket(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(handle_socket)
}

async fn handle_socket(mut socket: WebSocket) {
    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Websocket receive failed: {}", e);
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let reply = reverse_text(text.as_str());
                if socket.send(Message::Text(reply.into())).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

/// Reverse a string by extended grapheme clusters
fn reverse_text(text: &str) -> String {
    text.graphemes(true).rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_text() {
        assert_eq!(reverse_text("hello"), "olleh");
        assert_eq!(reverse_text(""), "");
        assert_eq!(reverse_text("日本語"), "語本日");
    }

    #[test]
    fn test_reverse_text_keeps_combining_marks() {
        assert_eq!(reverse_text("e\u{301}a"), "ae\u{301}");
        assert_eq!(reverse_text("n\u{303}o"), "on\u{303}");
    }
}
