#[cfg(test)]
#[path = "sse_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use bytes::Bytes;
use futures::Stream;
use serde_derive::Deserialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use crate::domain::models::Event;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct StreamPayload {
    token: Option<String>,
    error: Option<String>,
}

/// Consumes a `data: `-framed SSE body, emitting one `Event::StreamToken` per
/// token payload, in arrival order. Lines without the `data: ` prefix
/// (comments, `event:`/`id:` fields, keep-alive blanks) are ignored, as are
/// payloads that fail to parse. A payload with a non-empty `error` aborts the
/// stream with that message; the `[DONE]` sentinel ends it successfully and
/// nothing past it is read.
///
/// `StreamReader` buffers raw bytes until a full line is available, so lines
/// and multi-byte characters split across network reads are reassembled
/// before decoding. The backend omitting `[DONE]` and closing the connection
/// counts as success as well.
pub async fn consume_sse<S>(stream: S, tx: &mpsc::UnboundedSender<Event>) -> Result<()>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    let mut lines_reader = StreamReader::new(stream).lines();

    while let Some(line) = lines_reader.next_line().await? {
        let trimmed = line.trim();
        if !trimmed.starts_with(DATA_PREFIX) {
            continue;
        }

        let payload = &trimmed[DATA_PREFIX.len()..];
        if payload == DONE_SENTINEL {
            return Ok(());
        }

        let parsed = match serde_json::from_str::<StreamPayload>(payload) {
            Ok(parsed) => parsed,
            // Heartbeats and partial lines are expected protocol noise.
            Err(_) => continue,
        };

        if let Some(error) = parsed.error {
            if !error.is_empty() {
                bail!(error);
            }
        }

        if let Some(token) = parsed.token {
            tx.send(Event::StreamToken(token))?;
        }
    }

    return Ok(());
}
