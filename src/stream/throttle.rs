//! Latest-wins throttling for snapshot streams

use futures::Stream;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Sleep, sleep_until};

/// Extension trait to add throttling to any Stream
pub trait ThrottleExt: Stream {
    /// Emit at most one item per `period`.
    ///
    /// Items arriving while the gate is closed overwrite each other; only the
    /// most recent is emitted when it reopens. The first item passes
    /// immediately, and a pending item is still delivered if the inner
    /// stream ends.
    fn throttle(self, period: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, period)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// A stream combinator that limits emission rate, latest wins
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: S,
        #[pin]
        gate: Sleep,
        period: Duration,
        latest: Option<S::Item>,
        exhausted: bool,
    }
}

impl<S: Stream> Throttle<S> {
    pub fn new(stream: S, period: Duration) -> Self {
        Self {
            stream,
            gate: sleep_until(Instant::now()),
            period,
            latest: None,
            exhausted: false,
        }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain everything ready so far, keeping only the newest item
        while !*this.exhausted {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.latest = Some(item),
                Poll::Ready(None) => *this.exhausted = true,
                Poll::Pending => break,
            }
        }

        if this.latest.is_none() {
            return if *this.exhausted { Poll::Ready(None) } else { Poll::Pending };
        }

        // Deliver the final item without waiting once the source is done
        if !*this.exhausted && this.gate.as_mut().poll(cx).is_pending() {
            return Poll::Pending;
        }

        this.gate.as_mut().reset(Instant::now() + *this.period);
        Poll::Ready(this.latest.take())
    }
}
