//! Pull-based event sources.
//!
//! The runtime asks an [`EventFeed`] for one event at a time and dispatches it
//! completely before asking again. Anything that wants to buffer or fan out
//! events does so behind this trait; [`ChannelFeed`] is the simplest such
//! boundary.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TransportResult;
use crate::event::Event;

/// A sequential, potentially infinite source of events.
#[async_trait]
pub trait EventFeed: Send {
    /// Waits for the next event.
    ///
    /// Returns `Ok(None)` once the feed is exhausted.
    async fn next_event(&mut self) -> TransportResult<Option<Event>>;
}

/// A boxed feed trait object.
pub type BoxedFeed = Box<dyn EventFeed>;

#[async_trait]
impl<F: EventFeed + ?Sized> EventFeed for Box<F> {
    async fn next_event(&mut self) -> TransportResult<Option<Event>> {
        (**self).next_event().await
    }
}

/// An [`EventFeed`] backed by a tokio mpsc channel.
///
/// The feed ends when every sender has been dropped.
#[derive(Debug)]
pub struct ChannelFeed {
    rx: mpsc::Receiver<Event>,
}

impl ChannelFeed {
    /// Creates a feed and the sender that fills it.
    pub fn new(buffer: usize) -> (mpsc::Sender<Event>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

impl From<mpsc::Receiver<Event>> for ChannelFeed {
    fn from(rx: mpsc::Receiver<Event>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl EventFeed for ChannelFeed {
    async fn next_event(&mut self) -> TransportResult<Option<Event>> {
        Ok(self.rx.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_feed_preserves_order_and_ends() {
        let (tx, mut feed) = ChannelFeed::new(4);
        tx.send(Event::Unsupported { kind: "a".into() }).await.unwrap();
        tx.send(Event::Unsupported { kind: "b".into() }).await.unwrap();
        drop(tx);

        let first = feed.next_event().await.unwrap().unwrap();
        let second = feed.next_event().await.unwrap().unwrap();
        assert_eq!(first.kind_name(), "a");
        assert_eq!(second.kind_name(), "b");
        assert!(feed.next_event().await.unwrap().is_none());
    }
}
