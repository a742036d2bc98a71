//! Streamed answer decoding.
//!
//! Decoding server-sent events needs reqwest's byte streams, which are only
//! compiled in with the `streaming` feature. Without it [`StreamDecoder`] is an
//! uninhabited type and [`StreamDecoder::detect`] returns `None`.

use super::ClientError;
use std::io::Write;

#[cfg(feature = "streaming")]
pub use enabled::StreamDecoder;

#[cfg(not(feature = "streaming"))]
pub use disabled::StreamDecoder;

#[cfg(feature = "streaming")]
mod enabled {
    use super::{ClientError, Write};
    use crate::client::render::RenderState;
    use crate::client::sse::SseParser;
    use crate::protocol::StreamEvent;
    use futures::StreamExt;
    use tracing::debug;

    /// Capability to decode `text/event-stream` responses.
    #[derive(Debug, Clone, Copy)]
    pub struct StreamDecoder {
        _private: (),
    }

    impl StreamDecoder {
        pub fn detect() -> Option<Self> {
            Some(Self { _private: () })
        }

        /// Render every event of `response` as it arrives.
        ///
        /// The first payload that is not a stream event ends the answer. A broken
        /// connection ends it with [`ClientError::StreamTransport`]; text already
        /// written stays in place.
        pub async fn render<W: Write>(
            &self,
            response: reqwest::Response,
            out: &mut W,
            hide_reasoning: bool,
        ) -> Result<(), ClientError> {
            let mut body = response.bytes_stream();
            let mut parser = SseParser::new();
            let mut state = RenderState::new(hide_reasoning);
            let mut events = 0usize;

            'read: loop {
                match body.next().await {
                    Some(Ok(chunk)) => {
                        for payload in parser.push(&chunk) {
                            if !render_event(&mut state, out, &payload)? {
                                break 'read;
                            }
                            events += 1;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("Stream interrupted after {} events: {}", events, e);
                        writeln!(out)?;
                        out.flush()?;
                        return Err(ClientError::StreamTransport(e));
                    }
                    None => {
                        if let Some(payload) = parser.finish() {
                            if render_event(&mut state, out, &payload)? {
                                events += 1;
                            }
                        }
                        break;
                    }
                }
            }

            debug!(events, phase = ?state.phase(), "Stream finished");
            state.finish(out)?;
            Ok(())
        }
    }

    /// Render one event payload. Returns `false` when the payload ends the stream.
    fn render_event<W: Write>(
        state: &mut RenderState,
        out: &mut W,
        payload: &str,
    ) -> Result<bool, ClientError> {
        let event: StreamEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                debug!("Ending stream on non-event payload {:?}: {}", payload, e);
                return Ok(false);
            }
        };

        if let Some(choice) = event.choices.first() {
            state.render_delta(out, &choice.delta)?;
        }
        Ok(true)
    }
}

#[cfg(not(feature = "streaming"))]
mod disabled {
    use super::{ClientError, Write};

    /// Streaming support is compiled out; no value of this type exists.
    #[derive(Debug, Clone, Copy)]
    pub enum StreamDecoder {}

    impl StreamDecoder {
        pub fn detect() -> Option<Self> {
            None
        }

        pub async fn render<W: Write>(
            &self,
            _response: reqwest::Response,
            _out: &mut W,
            _hide_reasoning: bool,
        ) -> Result<(), ClientError> {
            match *self {}
        }
    }
}
