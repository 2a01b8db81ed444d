//! Record-delimited encoding of intermediate and output files.
//!
//! Every [`KeyValue`] is written as one JSON object followed by a newline,
//! so a reader can decode records one at a time until the stream runs out.

use std::io::{self, BufWriter, Read, Write};

use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer};
use thiserror::Error;

use crate::KeyValue;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode record")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode record")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Appends records to a buffered stream.
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
            written: 0,
        }
    }

    pub fn write(&mut self, kv: &KeyValue) -> Result<(), CodecError> {
        serde_json::to_writer(&mut self.inner, kv).map_err(|e| {
            if e.is_io() {
                CodecError::Io(e.into())
            } else {
                CodecError::Encode(e)
            }
        })?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes buffered records and hands back the underlying stream.
    pub fn into_inner(self) -> Result<W, CodecError> {
        self.inner.into_inner().map_err(|e| e.into_error().into())
    }
}

/// Decodes records from a stream, one at a time.
///
/// Yields `None` once the stream is cleanly exhausted. A truncated or
/// malformed record yields an error.
pub struct RecordReader<R: Read> {
    stream: StreamDeserializer<'static, IoRead<io::BufReader<R>>, KeyValue>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            stream: Deserializer::from_reader(io::BufReader::new(inner)).into_iter(),
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<KeyValue, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next().map(|res| {
            res.map_err(|e| {
                if e.is_io() {
                    CodecError::Io(e.into())
                } else {
                    CodecError::Decode(e)
                }
            })
        })
    }
}
