use std::convert::Infallible;
use std::fmt::Display;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

/// Copy upstream chunks through in arrival order. The first read
/// error ends the stream without emitting anything further, so the
/// client just sees the body close.
pub fn relay_stream<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, Infallible>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    async_stream::stream! {
        let mut upstream = Box::pin(upstream);
        let mut relayed = 0usize;

        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    relayed += bytes.len();
                    yield Ok(bytes);
                }
                Err(e) => {
                    tracing::error!("Streaming error: {}", e);
                    break;
                }
            }
        }

        tracing::debug!("Relay stream closed after {} bytes", relayed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::stream;
    use std::io;
    use std::time::Duration;

    async fn collect<S: Stream<Item = Result<Bytes, Infallible>>>(s: S) -> Vec<Bytes> {
        s.map(|chunk| match chunk {
            Ok(bytes) => bytes,
            Err(never) => match never {},
        })
        .collect()
        .await
    }

    #[tokio::test]
    async fn test_relays_chunks_in_order() {
        let upstream = stream::iter(vec![
            Ok::<_, io::Error>(Bytes::from_static(b"data: one\n")),
            Ok(Bytes::from_static(b"data: two\n")),
        ]);

        let chunks = collect(relay_stream(upstream)).await;
        assert_eq!(
            chunks,
            vec![
                Bytes::from_static(b"data: one\n"),
                Bytes::from_static(b"data: two\n")
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_error() {
        let upstream = stream::iter(vec![
            Ok(Bytes::from_static(b"data: one\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(b"data: never\n")),
        ]);

        let chunks = collect(relay_stream(upstream)).await;
        assert_eq!(chunks, vec![Bytes::from_static(b"data: one\n")]);
    }

    #[tokio::test]
    async fn test_yields_chunks_while_upstream_is_open() {
        let (tx, rx) = mpsc::unbounded::<Result<Bytes, io::Error>>();
        let mut relayed = Box::pin(relay_stream(rx));

        tx.unbounded_send(Ok(Bytes::from_static(b"data: one\n")))
            .unwrap();
        let first = tokio::time::timeout(Duration::from_secs(1), relayed.next())
            .await
            .expect("First chunk was held back until upstream ended");
        assert!(matches!(first, Some(Ok(ref b)) if b.as_ref() == b"data: one\n"));

        tx.unbounded_send(Ok(Bytes::from_static(b"data: two\n")))
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), relayed.next())
            .await
            .expect("Second chunk was held back until upstream ended");
        assert!(matches!(second, Some(Ok(ref b)) if b.as_ref() == b"data: two\n"));

        // Closing upstream ends the relayed stream
        drop(tx);
        let end = tokio::time::timeout(Duration::from_secs(1), relayed.next())
            .await
            .expect("Relay stream didn't end with upstream");
        assert!(end.is_none());
    }
}
