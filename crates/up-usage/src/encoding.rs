//! Streaming JSON array output.
//!
//! [`JsonArrayEncoder`] writes records to a sink as they arrive, one per line,
//! without holding the whole array in memory:
//!
//! ```text
//! [
//! {"name":"a",...},
//! {"name":"b",...}
//! ]
//! ```

use std::io::Write;

use serde::Serialize;
use tracing::warn;

use crate::error::{Result, UsageError};

const OPEN: &[u8] = b"[";
const CLOSE: &[u8] = b"\n]\n";

/// Encodes a sequence of records as a JSON array written incrementally to `W`.
///
/// The opening bracket is written by [`new`](Self::new) and the closing bracket
/// by [`close`](Self::close). An encoder dropped without being closed writes
/// the closing bracket on a best-effort basis, so the array is terminated on
/// every exit path.
///
/// ```
/// use up_usage::JsonArrayEncoder;
///
/// let mut enc = JsonArrayEncoder::new(Vec::new()).unwrap();
/// enc.encode(&serde_json::json!({"a": 1})).unwrap();
/// enc.encode(&serde_json::json!({"b": 2})).unwrap();
/// let out = enc.close().unwrap();
/// assert_eq!(out, b"[\n{\"a\":1},\n{\"b\":2}\n]\n");
/// ```
#[derive(Debug)]
pub struct JsonArrayEncoder<W: Write> {
    /// Always `Some` while the encoder is reachable. Only `close` and `drop`
    /// take it, and both end the encoder's life; the `Option` exists so
    /// `close` can move the sink out of a type that implements `Drop`.
    sink: Option<W>,
    wrote_first_item: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    /// Opens a JSON array on `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Write`] if the opening bracket cannot be written.
    pub fn new(mut sink: W) -> Result<Self> {
        sink.write_all(OPEN).map_err(UsageError::Write)?;
        Ok(Self {
            sink: Some(sink),
            wrote_first_item: false,
        })
    }

    /// Appends one record to the array.
    ///
    /// The record is serialized before anything is written, so a serialization
    /// failure leaves the output untouched. The separator state only advances
    /// after a successful write.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Encoding`] if `record` cannot be serialized and
    /// [`UsageError::Write`] if the sink rejects the bytes. A failed write may
    /// leave a partial record in the sink.
    pub fn encode<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<()> {
        let json = serde_json::to_vec(record).map_err(UsageError::Encoding)?;

        let mut buf = Vec::with_capacity(json.len() + 2);
        if self.wrote_first_item {
            buf.push(b',');
        }
        buf.push(b'\n');
        buf.extend_from_slice(&json);

        // Unreachable while `sink` holds its invariant; reported rather than
        // panicking.
        let Some(sink) = self.sink.as_mut() else {
            return Err(UsageError::Write(std::io::Error::other("encoder sink missing")));
        };
        sink.write_all(&buf).map_err(UsageError::Write)?;
        self.wrote_first_item = true;
        Ok(())
    }

    /// Returns true once at least one record has been written.
    #[must_use]
    pub const fn wrote_first_item(&self) -> bool {
        self.wrote_first_item
    }

    /// Returns a reference to the underlying sink.
    #[must_use]
    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref()
    }

    /// Terminates the array and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Write`] if the closing bracket cannot be written
    /// or flushed.
    pub fn close(mut self) -> Result<W> {
        let Some(mut sink) = self.sink.take() else {
            return Err(UsageError::Write(std::io::Error::other("encoder sink missing")));
        };
        sink.write_all(CLOSE).map_err(UsageError::Write)?;
        sink.flush().map_err(UsageError::Write)?;
        Ok(sink)
    }
}

impl<W: Write> Drop for JsonArrayEncoder<W> {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(err) = sink.write_all(CLOSE).and_then(|()| sink.flush()) {
                warn!(error = %err, "failed to close JSON array on drop");
            }
        }
    }
}
