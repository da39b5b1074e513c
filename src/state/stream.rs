//! State event stream
//!
//! Adapts a listener registration into a `Stream` of [`StateEvent`]s for
//! long-lived consumers such as the SSE endpoint.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::debug;

use super::manager::{Listener, StateEvent, StateManager, Subscription};

/// Events delivered to one subscription. Dropping the stream unsubscribes.
pub struct StateEventStream {
    events: UnboundedReceiverStream<StateEvent>,
    subscription: Option<Subscription>,
}

impl StateManager {
    /// Subscribes to `event` and returns the deliveries as a stream.
    ///
    /// `None` when the event is at its listener cap.
    pub async fn event_stream(&self, event: &str) -> Option<StateEventStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener: Listener = Arc::new(move |event: &StateEvent| {
            // Receiver gone means the stream is being dropped
            let _ = tx.send(event.clone());
        });

        let subscription = self.subscribe(event, listener).await?;
        Some(StateEventStream {
            events: UnboundedReceiverStream::new(rx),
            subscription: Some(subscription),
        })
    }
}

impl Stream for StateEventStream {
    type Item = StateEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StateEvent>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl Drop for StateEventStream {
    fn drop(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let event = subscription.event().to_string();
                    if subscription.unsubscribe().await {
                        debug!("Event stream for '{}' closed, listener removed", event);
                    }
                });
            }
            Err(_) => debug!("No runtime at stream drop, listener left registered"),
        }
    }
}
