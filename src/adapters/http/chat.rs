//! Chat endpoint: request validation and the SSE streaming protocol.
//!
//! Frame sequence per request: zero or more `token` frames in emission
//! order, then exactly one terminal frame (`done` on success, `error` on
//! failure). A client disconnect drops the frame stream mid-flight, which
//! cancels the producer; nothing is written after that, terminals included.

use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::assistant::AnswerStream;

use super::AppState;

/// Generic client-facing failure message; detail stays in the server log.
const GENERIC_ERROR: &str = "Failed to generate response.";

#[derive(Debug, Deserialize)]
pub(crate) struct ChatBody {
    /// Kept as a raw value so a non-string message rejects with the same
    /// structured error as a missing one.
    #[serde(default)]
    message: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct TokenFrame<'a> {
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorFrame<'a> {
    error: &'a str,
}

#[derive(Debug, Serialize)]
struct DoneFrame {
    ok: bool,
}

pub(crate) async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let message = match validated_message(body) {
        Ok(message) => message,
        Err(response) => return response,
    };

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, chars = message.len(), "chat request accepted");

    let answer = state.assistant.answer(message);
    let sse = Sse::new(frame_stream(answer, request_id));

    // Intermediaries must not buffer or cache the event stream.
    let headers = [
        (header::CACHE_CONTROL, "no-cache, no-transform"),
        (HeaderName::from_static("x-accel-buffering"), "no"),
    ];

    (headers, sse).into_response()
}

/// Trimmed message text, or the structured 400 response.
fn validated_message(body: Result<Json<ChatBody>, JsonRejection>) -> Result<String, Response> {
    let message = match body {
        Ok(Json(chat_body)) => chat_body.message,
        Err(_) => None,
    };

    message
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "message is required" })),
            )
                .into_response()
        })
}

enum FrameSource {
    Streaming(AnswerStream),
    Finished,
}

/// Convert the answer stream into SSE frames with a single terminal frame.
fn frame_stream(
    answer: AnswerStream,
    request_id: Uuid,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(FrameSource::Streaming(answer), move |source| async move {
        match source {
            FrameSource::Streaming(mut answer) => match answer.next().await {
                Some(Ok(token)) => Some((
                    Ok(frame("token", &TokenFrame { token: &token })),
                    FrameSource::Streaming(answer),
                )),
                Some(Err(err)) => {
                    tracing::error!(%request_id, error = %err, "chat stream failed");
                    Some((
                        Ok(frame("error", &ErrorFrame { error: GENERIC_ERROR })),
                        FrameSource::Finished,
                    ))
                }
                None => Some((
                    Ok(frame("done", &DoneFrame { ok: true })),
                    FrameSource::Finished,
                )),
            },
            FrameSource::Finished => None,
        }
    })
}

fn frame(kind: &'static str, payload: &impl Serialize) -> Event {
    match Event::default().event(kind).json_data(payload) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!(error = %err, "failed to encode stream frame");
            Event::default().event("error").data("{}")
        }
    }
}
