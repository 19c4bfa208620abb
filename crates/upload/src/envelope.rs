//! Envelope framing for `POST /add/files`.
//!
//! # Wire format
//!
//! ```text
//! [uvarint: N]
//! [N bytes: JSON array of {"name","dir","size","type"}]
//! [descriptor 0 size bytes: raw file data]
//! [descriptor 1 size bytes: raw file data]
//! ...
//! ```
//!
//! The body is streamed: the prefix and descriptors go out first, then each
//! file is read from its handle in turn.

use bytes::Bytes;
use futures_util::future;
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::ReaderStream;

use crate::error::UploadError;
use crate::varint::{MAX_VARINT_LEN, put_uvarint, read_uvarint};

/// Per-file metadata carried in the descriptor block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub dir: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub category: i64,
}

/// A framed upload body, not yet read.
///
/// Owns the file sources; dropping the envelope (or the stream it turns
/// into) closes them.
#[derive(Debug)]
pub struct Envelope<R> {
    head: Bytes,
    sources: Vec<(R, u64)>,
    content_length: u64,
}

impl<R> Envelope<R>
where
    R: AsyncRead + Send + Sync + 'static,
{
    /// Frames `descriptors` and pairs them with `sources`, each a reader and
    /// the number of bytes to take from it.
    ///
    /// Descriptor `i` must declare exactly the size of source `i`.
    pub fn encode(
        descriptors: &[FileDescriptor],
        sources: Vec<(R, u64)>,
    ) -> Result<Self, UploadError> {
        if descriptors.len() != sources.len() {
            return Err(UploadError::SourceCount {
                descriptors: descriptors.len(),
                sources: sources.len(),
            });
        }
        for (index, (descriptor, (_, supplied))) in descriptors.iter().zip(&sources).enumerate() {
            if descriptor.size != *supplied {
                return Err(UploadError::SourceSize {
                    index,
                    declared: descriptor.size,
                    supplied: *supplied,
                });
            }
        }

        let metadata = serde_json::to_vec(descriptors)?;
        let mut head = Vec::with_capacity(MAX_VARINT_LEN + metadata.len());
        put_uvarint(&mut head, metadata.len() as u64);
        head.extend_from_slice(&metadata);

        let content_length =
            head.len() as u64 + sources.iter().map(|(_, size)| size).sum::<u64>();

        Ok(Self {
            head: Bytes::from(head),
            sources,
            content_length,
        })
    }

    /// Exact number of bytes the stream yields.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Length prefix followed by the descriptor block.
    pub fn head(&self) -> &[u8] {
        &self.head
    }

    pub fn file_count(&self) -> usize {
        self.sources.len()
    }

    /// Turns the envelope into a lazy byte stream.
    ///
    /// Sources are read strictly one after another, each capped at its
    /// declared size so the framing cannot drift if a file grows.
    pub fn into_stream(
        self,
    ) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static {
        let head = stream::once(future::ready(Ok::<_, std::io::Error>(self.head)));
        let bodies = stream::iter(self.sources)
            .flat_map(|(source, size)| ReaderStream::new(source.take(size)));
        head.chain(bodies)
    }
}

/// Decodes the length prefix and descriptor block at the start of an envelope.
///
/// Returns the descriptors and the offset of the first file byte, or `None`
/// while `buf` does not yet hold the whole header.
pub fn read_header(
    buf: &[u8],
) -> Result<Option<(Vec<FileDescriptor>, usize)>, serde_json::Error> {
    let Some((len, prefix_len)) = read_uvarint(buf) else {
        return Ok(None);
    };
    let end = usize::try_from(len)
        .ok()
        .and_then(|len| prefix_len.checked_add(len));
    let Some(end) = end.filter(|&end| end <= buf.len()) else {
        return Ok(None);
    };

    let descriptors = serde_json::from_slice(&buf[prefix_len..end])?;
    Ok(Some((descriptors, end)))
}
