//! Long-polling event feed.
//!
//! `getUpdates` returns batches; the feed hands them out one event at a time
//! and only asks for the next batch once the buffer is empty. The offset is
//! advanced past every update received, so an update is confirmed to Telegram
//! by the poll that follows it.
//!
//! Updates are decoded one by one, so a single malformed update becomes an
//! `Unsupported` event instead of failing the whole batch.
//!
//! A failed poll is logged and retried after `retry_delay_secs`. Only a
//! rejected token (401/404) ends the feed with an error, since no retry can
//! fix it.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace, warn};

use teleroute_core::{ApiError, Event, EventFeed, TransportError, TransportResult};

use crate::api::{ApiClient, GetUpdates, decode_update};

/// An [`EventFeed`] over `getUpdates` long polling.
pub struct TelegramFeed {
    client: ApiClient,
    offset: Option<i64>,
    buffer: VecDeque<Event>,
}

impl TelegramFeed {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self {
            client,
            offset: None,
            buffer: VecDeque::new(),
        }
    }

    /// The offset the next poll will send.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    async fn poll(&self) -> Result<Vec<Value>, ApiError> {
        let config = self.client.config();
        let request = GetUpdates {
            offset: self.offset,
            timeout: config.poll_timeout_secs,
        };
        self.client
            .call_with_timeout(
                "getUpdates",
                &request,
                Some(config.poll_timeout() + config.request_timeout()),
            )
            .await
    }

    fn enqueue(&mut self, updates: Vec<Value>) {
        for raw in updates {
            let Some((update_id, event)) = decode_update(raw) else {
                warn!("Skipping update without update_id");
                continue;
            };
            let next = update_id + 1;
            self.offset = Some(self.offset.map_or(next, |offset| offset.max(next)));
            trace!(update_id, kind = %event.kind_name(), "Buffered update");
            self.buffer.push_back(event);
        }
    }
}

#[async_trait]
impl EventFeed for TelegramFeed {
    async fn next_event(&mut self) -> TransportResult<Option<Event>> {
        loop {
            if let Some(event) = self.buffer.pop_front() {
                return Ok(Some(event));
            }

            match self.poll().await {
                Ok(updates) => {
                    if !updates.is_empty() {
                        debug!(count = updates.len(), "Received updates");
                    }
                    self.enqueue(updates);
                }
                Err(ApiError::Rejected { code, description }) if code == 401 || code == 404 => {
                    return Err(TransportError::InvalidConfig(format!(
                        "Bot API rejected the token ({code}): {description}"
                    )));
                }
                Err(e) => {
                    let delay = self.client.config().retry_delay();
                    warn!(error = %e, retry_in = ?delay, "Failed to get updates");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl std::fmt::Debug for TelegramFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramFeed")
            .field("offset", &self.offset)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}
