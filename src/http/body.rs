//! Response body types
//!
//! Every handler returns the same boxed body so that buffered and
//! throttled responses can flow through one handler chain.

use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;
use tokio::time::Sleep;

pub type ResponseBody = http_body_util::combinators::UnsyncBoxBody<Bytes, Infallible>;

/// Body holding the whole payload in memory
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).boxed_unsync()
}

/// Body with no payload (HEAD responses, redirects)
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new().boxed_unsync()
}

/// Body that releases its payload in equal chunks, one per timer tick.
///
/// Used to emulate a slow link. Waiting happens on a tokio timer, so other
/// connections keep being served in between chunks.
pub struct ThrottledBody {
    remaining: Bytes,
    chunk_size: usize,
    tick: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ThrottledBody {
    /// Split `data` into at most `chunk_count` chunks spread over `total`.
    pub fn new(data: Bytes, chunk_count: u32, total: Duration) -> Self {
        let chunk_count = chunk_count.max(1);
        let chunk_size = data.len().div_ceil(chunk_count as usize).max(1);
        Self {
            remaining: data,
            chunk_size,
            tick: total / chunk_count,
            sleep: None,
        }
    }
}

impl Body for ThrottledBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        if self.remaining.is_empty() {
            return Poll::Ready(None);
        }

        if let Some(sleep) = self.sleep.as_mut() {
            ready!(sleep.as_mut().poll(cx));
        }

        let n = self.chunk_size.min(self.remaining.len());
        let chunk = self.remaining.split_to(n);
        let tick = self.tick;
        self.sleep = Some(Box::pin(tokio::time::sleep(tick)));

        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_throttled_body_delivers_all_bytes() {
        let data = Bytes::from_static(b"0123456789abcdefghij");
        let mut body = ThrottledBody::new(data.clone(), 4, Duration::from_millis(40));

        let mut frames = 0;
        let mut collected = Vec::new();
        let started = Instant::now();
        while let Some(frame) = body.frame().await {
            let chunk = frame.unwrap().into_data().unwrap();
            assert!(chunk.len() <= 5);
            collected.extend_from_slice(&chunk);
            frames += 1;
        }

        assert_eq!(frames, 4);
        assert_eq!(collected, data.to_vec());
        // three waits between four chunks
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_throttled_body_short_payload() {
        let body = ThrottledBody::new(Bytes::from_static(b"hi"), 100, Duration::from_millis(100));
        assert_eq!(body.size_hint().exact(), Some(2));
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"hi");
    }

    #[tokio::test]
    async fn test_throttled_body_empty_payload() {
        let body = ThrottledBody::new(Bytes::new(), 100, Duration::from_millis(100));
        assert!(body.is_end_stream());
        let bytes = body.collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}
