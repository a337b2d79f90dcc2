//! Incremental decoding of an agent event stream.

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use std::pin::Pin;
use tracing::{debug, warn};

use crate::error::StreamError;
use crate::sse::{ParsedSseEvent, SseParser};
use crate::traits::ByteStream;

/// Parsed events in arrival order.
pub type EventStream = Pin<Box<dyn Stream<Item = ParsedSseEvent> + Send>>;

struct DecoderState {
    bytes: ByteStream,
    parser: SseParser,
    /// Bytes received but not yet terminated by `\n`
    buffer: Vec<u8>,
    /// The body has returned `None` and must not be polled again
    drained: bool,
    finished: bool,
}

impl DecoderState {
    /// Pop one complete line off the buffer.
    ///
    /// Lines are split on the raw `\n` byte, which never occurs inside a
    /// multi-byte UTF-8 sequence, so a character split across two chunks is
    /// reassembled before it is decoded.
    fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let rest = self.buffer.split_off(pos + 1);
        let mut line = std::mem::replace(&mut self.buffer, rest);
        line.truncate(pos);
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn emit(mut self, event: ParsedSseEvent) -> Option<(ParsedSseEvent, Self)> {
        if event.is_done() {
            debug!("agent stream signalled completion");
            self.finished = true;
        }
        Some((event, self))
    }
}

/// Turn a body byte stream into parsed events.
///
/// A transport error ends the stream with one `stream_error` event; the frame
/// being accumulated at that point is discarded. A completion event also ends
/// the stream, even if more bytes follow.
pub fn decode_event_stream(bytes: ByteStream, request_id: Option<String>) -> EventStream {
    let parser = match request_id {
        Some(id) => SseParser::with_request_id(id),
        None => SseParser::new(),
    };
    let state = DecoderState {
        bytes,
        parser,
        buffer: Vec::new(),
        drained: false,
        finished: false,
    };

    let events = stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        loop {
            // First, try to process any complete lines in the buffer
            while let Some(line) = state.next_line() {
                if let Some(event) = state.parser.feed_line(&line) {
                    return state.emit(event);
                }
            }

            if state.drained {
                state.finished = true;
                return state.parser.finish().map(|event| (event, state));
            }

            // Need more data from the stream
            match state.bytes.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    let err = StreamError::from(e);
                    warn!(code = err.error_code(), error = %err, "agent stream interrupted");
                    state.parser.reset();
                    state.buffer.clear();
                    state.finished = true;
                    return Some((ParsedSseEvent::stream_error(err.to_string()), state));
                }
                None => {
                    // Body ended: an unterminated last line, then any open frame
                    state.drained = true;
                    if let Some(line) = state.take_remainder() {
                        if let Some(event) = state.parser.feed_line(&line) {
                            return state.emit(event);
                        }
                    }
                }
            }
        }
    });

    Box::pin(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::ParseStrategy;
    use crate::sse::event_types;
    use crate::traits::HttpError;
    use bytes::Bytes;
    use std::task::Poll;

    fn chunk(bytes: &'static [u8]) -> Result<Bytes, HttpError> {
        Ok(Bytes::from_static(bytes))
    }

    async fn collect(chunks: Vec<Result<Bytes, HttpError>>) -> Vec<ParsedSseEvent> {
        let bytes: ByteStream = Box::pin(stream::iter(chunks));
        decode_event_stream(bytes, Some("req-1".to_string()))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_frames_split_across_chunks() {
        let events = collect(vec![
            chunk(b"data: {\"message\":"),
            chunk(b"\"hello\"}\n"),
            chunk(b"\nevent: tool_error\ndata: {\"error\":\"ocr\"}\n\n"),
        ])
        .await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].field_str("message"), Some("hello"));
        assert_eq!(events[0].field_str("request_id"), Some("req-1"));
        assert_eq!(events[1].event_type, event_types::TOOL_ERROR);
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_chunks() {
        // "é" is 0xC3 0xA9
        let events = collect(vec![
            chunk(b"data: {\"name\":\"Ren\xC3"),
            chunk(b"\xA9e\"}\n\n"),
        ])
        .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field_str("name"), Some("Renée"));
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let events = collect(vec![chunk(b"data: {\"a\":1}\r\n\r\n")]).await;
        assert_eq!(events.len(), 1);
        assert!(events[0].is_success());
    }

    #[tokio::test]
    async fn test_done_ends_stream() {
        let events = collect(vec![
            chunk(b"data: {\"step\":1}\n\ndata: [DONE]\n\n"),
            chunk(b"data: {\"step\":2}\n\n"),
        ])
        .await;

        assert_eq!(events.len(), 2);
        assert!(events[1].is_done());
        assert_eq!(events[1].strategy(), ParseStrategy::SseDone);
    }

    #[tokio::test]
    async fn test_unterminated_final_frame_is_flushed() {
        let events = collect(vec![chunk(b"data: {\"final\":true}")]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event().and_then(|v| v.get("final")), Some(&serde_json::json!(true)));
    }

    #[tokio::test]
    async fn test_transport_error_becomes_stream_error_event() {
        let events = collect(vec![
            chunk(b"data: {\"step\":1}\n\ndata: {\"partial\""),
            Err(HttpError::Io("connection reset".to_string())),
            chunk(b"data: {\"never\":true}\n\n"),
        ])
        .await;

        assert_eq!(events.len(), 2);
        assert!(events[0].is_success());
        assert_eq!(events[1].event_type, event_types::STREAM_ERROR);
        assert!(!events[1].is_success());
        assert_eq!(
            events[1].error(),
            Some("Stream connection lost: IO error: connection reset")
        );
    }

    #[tokio::test]
    async fn test_body_not_polled_after_it_ends() {
        // The trailing "\r" is an unterminated blank line that completes the frame
        let mut chunks = vec![chunk(b"data: {\"a\":1}\n\r")].into_iter();
        let mut ended = false;
        let bytes: ByteStream = Box::pin(stream::poll_fn(move |_| {
            assert!(!ended, "body polled after returning None");
            let next = chunks.next();
            ended = next.is_none();
            Poll::Ready(next)
        }));

        let events: Vec<_> = decode_event_stream(bytes, None).collect().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event().and_then(|v| v.get("a")), Some(&serde_json::json!(1)));
    }

    #[tokio::test]
    async fn test_empty_body_yields_nothing() {
        let events = collect(vec![]).await;
        assert!(events.is_empty());
    }
}
