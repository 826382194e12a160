//! Bot API wire types and the JSON-over-HTTP caller.
//!
//! Every Bot API method is a POST of a JSON object to
//! `{api_url}/bot{token}/{method}`, answered with an envelope:
//!
//! ```json
//! { "ok": true,  "result": ... }
//! { "ok": false, "error_code": 400, "description": "Bad Request: chat not found" }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use teleroute_core::{
    ApiError, ApiResult, BotCommand, CallbackQuery, Event, Message, ParseMode, TransportError,
    TransportResult,
};

use crate::config::TelegramConfig;

// =============================================================================
// Envelope
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub(crate) fn into_result(self) -> ApiResult<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(ApiError::Transport(TransportError::InvalidResponse(
                "ok response without result".into(),
            ))),
            (false, _) => Err(ApiError::Rejected {
                code: self.error_code.unwrap_or_default(),
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Bot API name of a parse mode; `None` sends plain text.
pub(crate) fn parse_mode_name(mode: ParseMode) -> Option<&'static str> {
    match mode {
        ParseMode::None => None,
        ParseMode::Basic => Some("Markdown"),
        ParseMode::Extended => Some("MarkdownV2"),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetMyCommands<'a> {
    pub commands: &'a [BotCommand],
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SentMessage {
    pub message_id: i64,
}

/// One entry of a `getUpdates` result.
///
/// Exactly one optional field is set per update; kinds this adapter does not
/// decode land in `other`.
#[derive(Debug, Deserialize)]
pub(crate) struct Update {
    pub update_id: i64,
    #[serde(default)]
    message: Option<Message>,
    #[serde(default)]
    edited_message: Option<Message>,
    #[serde(default)]
    callback_query: Option<CallbackQuery>,
    #[serde(flatten)]
    other: BTreeMap<String, Value>,
}

impl Update {
    pub(crate) fn into_event(self) -> Event {
        if let Some(message) = self.message {
            Event::Message(message)
        } else if let Some(message) = self.edited_message {
            Event::EditedMessage(message)
        } else if let Some(query) = self.callback_query {
            Event::CallbackQuery(query)
        } else {
            Event::Unsupported {
                kind: self
                    .other
                    .into_keys()
                    .next()
                    .unwrap_or_else(|| "unknown".to_string()),
            }
        }
    }
}

/// Decodes one raw `getUpdates` entry into its id and event.
///
/// A body that does not decode still yields its id, as an `Unsupported`
/// event named after the update kind, so the offset can move past it.
/// `None` only when `update_id` itself is missing.
pub(crate) fn decode_update(raw: Value) -> Option<(i64, Event)> {
    let update_id = raw.get("update_id")?.as_i64()?;
    let kind = raw
        .as_object()
        .and_then(|fields| fields.keys().find(|key| *key != "update_id").cloned());

    match serde_json::from_value::<Update>(raw) {
        Ok(update) => Some((update.update_id, update.into_event())),
        Err(e) => {
            warn!(update_id, error = %e, "Undecodable update");
            Some((
                update_id,
                Event::Unsupported {
                    kind: kind.unwrap_or_else(|| "unknown".to_string()),
                },
            ))
        }
    }
}

// =============================================================================
// Caller
// =============================================================================

/// A cloneable handle for calling Bot API methods.
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: Client,
    config: Arc<TelegramConfig>,
}

impl ApiClient {
    pub(crate) fn new(config: Arc<TelegramConfig>) -> TransportResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub(crate) fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Calls `method` with the client's default timeout.
    pub(crate) async fn call<P, R>(&self, method: &str, params: &P) -> ApiResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.call_with_timeout(method, params, None).await
    }

    /// Calls `method`, overriding the request timeout (for long polls).
    pub(crate) async fn call_with_timeout<P, R>(
        &self,
        method: &str,
        params: &P,
        timeout: Option<Duration>,
    ) -> ApiResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        trace!(method, "Calling Bot API");

        let mut request = self.http.post(self.config.method_url(method)).json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // Rejections come back as 4xx with a regular envelope, so the status
        // code is not checked here.
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed(e.without_url().to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::RequestFailed(e.without_url().to_string()))?;

        let envelope: ApiResponse<R> = serde_json::from_slice(&body).map_err(|e| {
            TransportError::InvalidResponse(format!("HTTP {}: {e}", status.as_u16()))
        })?;
        envelope.into_result()
    }
}
