//! Per-call output capture.
//!
//! An [`OutputCapture`] is created for one execution, handed to the executor
//! by `&mut`, and consumed afterwards. There is no shared stream to redirect
//! or restore.

use crate::error::{ExecError, ExecResult};

/// Buffer that collects what a snippet prints, up to an optional limit.
#[derive(Debug, Default)]
pub struct OutputCapture {
    buf: Vec<u8>,
    limit: Option<usize>,
}

impl OutputCapture {
    /// Create an unbounded capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a capture that refuses to grow beyond `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit: Some(limit),
        }
    }

    /// The byte limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Bytes that can still be written before the limit is hit.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.buf.len()))
    }

    /// Append bytes.
    ///
    /// Fails with [`ExecError::OutputLimit`] when the write would exceed the
    /// limit; in that case nothing is appended.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> ExecResult<()> {
        if let Some(limit) = self.limit {
            if self.buf.len() + bytes.len() > limit {
                return Err(ExecError::OutputLimit(limit));
            }
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append text.
    pub fn write_str(&mut self, text: &str) -> ExecResult<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Number of captured bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the capture, decoding it as UTF-8 (invalid sequences replaced).
    pub fn into_string(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_capture_collects_everything() {
        let mut capture = OutputCapture::new();
        capture.write_str("Hello, ").unwrap();
        capture.write_str("World!\n").unwrap();
        assert_eq!(capture.len(), 14);
        assert_eq!(capture.into_string(), "Hello, World!\n");
    }

    #[test]
    fn test_limit_rejects_overflowing_write() {
        let mut capture = OutputCapture::with_limit(4);
        capture.write_str("abc").unwrap();
        assert_eq!(capture.remaining(), Some(1));
        let err = capture.write_str("de").unwrap_err();
        assert!(matches!(err, ExecError::OutputLimit(4)));
        assert_eq!(capture.into_string(), "abc");
    }

    #[test]
    fn test_limit_allows_exact_fit() {
        let mut capture = OutputCapture::with_limit(3);
        capture.write_str("abc").unwrap();
        assert_eq!(capture.remaining(), Some(0));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut capture = OutputCapture::new();
        capture.write_bytes(&[b'o', b'k', 0xff]).unwrap();
        assert_eq!(capture.into_string(), "ok\u{FFFD}");
    }

    #[test]
    fn test_new_capture_is_empty() {
        let capture = OutputCapture::new();
        assert!(capture.is_empty());
        assert_eq!(capture.limit(), None);
        assert_eq!(capture.remaining(), None);
    }
}
