//! Bounded event channel between a running conversation and an
//! observer.
//!
//! The emitter side is held by the orchestrator; the stream side is for
//! the caller. Emission applies backpressure when the buffer is full
//! and degrades to a no-op once the consumer drops its stream, so an
//! abandoned observer never wedges a run.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use colloquy_core::ConversationEvent;

/// Default event buffer size.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Create a connected emitter/stream pair.
pub fn event_channel(capacity: usize) -> (EventEmitter, EventStream) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventEmitter { tx: Some(tx) }, EventStream { rx })
}

/// Sends conversation events to an observer, if one is attached.
#[derive(Clone, Default)]
pub struct EventEmitter {
    tx: Option<mpsc::Sender<ConversationEvent>>,
}

impl EventEmitter {
    /// An emitter with no observer. Every emit is a no-op.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn emit(&self, event: ConversationEvent) {
        let Some(tx) = &self.tx else { return };
        if tx.send(event).await.is_err() {
            debug!("event consumer dropped, discarding event");
        }
    }
}

/// Receives conversation events in emission order.
pub struct EventStream {
    rx: mpsc::Receiver<ConversationEvent>,
}

impl EventStream {
    /// The next event, or `None` once the run has finished and the
    /// buffer is drained.
    pub async fn next(&mut self) -> Option<ConversationEvent> {
        self.rx.recv().await
    }

    /// Drain every remaining event.
    pub async fn collect(mut self) -> Vec<ConversationEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }

    /// Adapt into a [`tokio_stream::Stream`].
    pub fn into_stream(self) -> ReceiverStream<ConversationEvent> {
        ReceiverStream::new(self.rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::StopReason;

    #[tokio::test]
    async fn delivers_in_order() {
        let (emitter, mut stream) = event_channel(8);
        emitter
            .emit(ConversationEvent::ConversationStarted {
                participants: vec![],
            })
            .await;
        emitter
            .emit(ConversationEvent::ConversationEnded {
                stop_reason: StopReason::Cancelled,
            })
            .await;
        drop(emitter);

        assert!(matches!(
            stream.next().await,
            Some(ConversationEvent::ConversationStarted { .. })
        ));
        assert!(matches!(
            stream.next().await,
            Some(ConversationEvent::ConversationEnded { .. })
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn dropped_consumer_does_not_block_emission() {
        let (emitter, stream) = event_channel(1);
        drop(stream);
        for _ in 0..10 {
            emitter
                .emit(ConversationEvent::ConversationEnded {
                    stop_reason: StopReason::Cancelled,
                })
                .await;
        }
    }

    #[tokio::test]
    async fn disabled_emitter_is_a_noop() {
        let emitter = EventEmitter::disabled();
        emitter
            .emit(ConversationEvent::ConversationEnded {
                stop_reason: StopReason::Cancelled,
            })
            .await;
    }
}
