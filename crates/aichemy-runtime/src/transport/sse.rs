use aichemy_types::StreamEvent;

const DATA_PREFIX: &[u8] = b"data:";

/// Incremental decoder for the agent's `data: <json>` line protocol.
///
/// Bytes are buffered until a newline arrives, so records split across
/// network reads (including inside a UTF-8 sequence) decode intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns every event completed by it, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline_index) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_index).collect();
            if let Some(event) = parse_record(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Decode whatever is left once the body has ended
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        parse_record(&rest)
    }

    /// Bytes held for an incomplete line
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

/// Decode a single line. Blank lines, comments, other SSE fields and
/// malformed payloads yield `None`.
pub fn parse_record(line: &[u8]) -> Option<StreamEvent> {
    let mut line = line;
    while let Some((last, rest)) = line.split_last() {
        if *last == b'\n' || *last == b'\r' {
            line = rest;
        } else {
            break;
        }
    }
    if line.is_empty() {
        return None;
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        tracing::trace!(line = %String::from_utf8_lossy(line), "skipping non-data line");
        return None;
    };
    let payload = payload.strip_prefix(b" ").unwrap_or(payload);

    match serde_json::from_slice::<StreamEvent>(payload) {
        Ok(event) => {
            tracing::debug!(kind = event.kind(), "decoded stream record");
            Some(event)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                payload = %String::from_utf8_lossy(payload),
                "dropping malformed stream record"
            );
            None
        }
    }
}
