//! Incremental UTF-8 decoding across transport chunk boundaries.
//!
//! Transport chunks are cut at arbitrary byte offsets, so a multi-byte
//! scalar value can straddle two chunks. The decoder holds back the
//! incomplete tail of a chunk and prepends it to the next one instead of
//! re-decoding from scratch.

use pubkb_types::RenderError;

/// Stateful UTF-8 decoder for a chunked byte stream.
#[derive(Debug, Default)]
pub(crate) struct StreamDecoder {
    /// Bytes of an incomplete scalar value held back from the previous
    /// chunk. At most 3 bytes.
    carry: Vec<u8>,
}

impl StreamDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning the complete text it yields.
    ///
    /// A scalar value split across the chunk boundary is held back and
    /// emitted with the following chunk. Genuinely invalid bytes fail the
    /// call and nothing from the chunk is returned.
    pub(crate) fn decode(&mut self, chunk: &[u8]) -> Result<String, RenderError> {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                let utf8_err = err.utf8_error();
                if utf8_err.error_len().is_some() {
                    return Err(RenderError::Decode(utf8_err.to_string()));
                }
                // Incomplete scalar at the chunk boundary: hold back the
                // tail, emit the valid prefix.
                let valid = utf8_err.valid_up_to();
                let mut bytes = err.into_bytes();
                self.carry = bytes.split_off(valid);
                String::from_utf8(bytes).map_err(|e| RenderError::Decode(e.to_string()))
            }
        }
    }

    /// Signal end of stream. A dangling partial scalar means the stream
    /// ended inside a character and is reported as a decode error.
    pub(crate) fn finish(&mut self) -> Result<(), RenderError> {
        if self.carry.is_empty() {
            Ok(())
        } else {
            Err(RenderError::Decode(format!(
                "truncated {}-byte UTF-8 sequence at end of stream",
                self.carry.len()
            )))
        }
    }
}
