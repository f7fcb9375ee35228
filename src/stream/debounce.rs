//! Stream debouncing utilities

use futures::Stream;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Sleep, sleep};

/// Extension trait to add debouncing to any Stream
pub trait DebounceExt: Stream {
    /// Emit an item only after the source has been quiet for `duration`
    ///
    /// Uses "latest-wins" semantics - every new item restarts the quiet
    /// period and replaces the pending one, so a burst of items yields a
    /// single emission.
    fn debounce(self, duration: Duration) -> Debounce<Self>
    where
        Self: Sized,
    {
        Debounce::new(self, duration)
    }
}

impl<T: Stream> DebounceExt for T {}

pin_project! {
    /// A stream combinator that delays emission until the source goes quiet
    pub struct Debounce<S: Stream> {
        #[pin]
        stream: S,
        #[pin]
        delay: Sleep,
        pending: Option<S::Item>,
        duration: Duration,
        done: bool,
    }
}

impl<S: Stream> Debounce<S> {
    /// Create a new debounced stream
    pub fn new(stream: S, duration: Duration) -> Self {
        Self { stream, delay: sleep(duration), pending: None, duration, done: false }
    }
}

impl<S: Stream> Stream for Debounce<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain all available items, keeping only the latest and
        // restarting the quiet period each time
        while !*this.done {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    *this.pending = Some(item);
                    this.delay.as_mut().reset(Instant::now() + *this.duration);
                }
                Poll::Ready(None) => {
                    // Source ended: flush whatever is pending immediately
                    *this.done = true;
                }
                Poll::Pending => break,
            }
        }

        if *this.done {
            return Poll::Ready(this.pending.take());
        }

        if this.pending.is_some() {
            match this.delay.as_mut().poll(cx) {
                Poll::Ready(()) => Poll::Ready(this.pending.take()),
                Poll::Pending => Poll::Pending,
            }
        } else {
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_stream::wrappers::ReceiverStream;

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_latest() {
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        let mut debounced = std::pin::pin!(ReceiverStream::new(rx).debounce(Duration::from_millis(500)));

        tx.send("f").await.unwrap();
        tx.send("fl").await.unwrap();
        tx.send("flo").await.unwrap();
        drop(tx);

        // Source ends, pending item flushes
        assert_eq!(debounced.next().await, Some("flo"));
        assert_eq!(debounced.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_period_restarts_on_each_item() {
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        let mut debounced = std::pin::pin!(ReceiverStream::new(rx).debounce(Duration::from_millis(500)));

        tx.send(1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(2).await.unwrap();

        // 300ms after the second item the quiet period has not elapsed
        let poll = tokio::time::timeout(Duration::from_millis(300), debounced.next()).await;
        assert!(poll.is_err(), "emitted before the quiet period elapsed");

        // 200ms more and it fires with the latest item
        let item = tokio::time::timeout(Duration::from_millis(300), debounced.next())
            .await
            .expect("should emit after quiet period");
        assert_eq!(item, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn separate_items_emit_separately() {
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        let mut debounced = std::pin::pin!(ReceiverStream::new(rx).debounce(Duration::from_millis(100)));

        tx.send("a").await.unwrap();
        assert_eq!(debounced.next().await, Some("a"));

        tx.send("b").await.unwrap();
        assert_eq!(debounced.next().await, Some("b"));
    }
}
