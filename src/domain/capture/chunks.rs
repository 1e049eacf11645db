//! Encoded chunk accumulation and container assembly

use std::time::Duration;

/// Mime type of every finished recording
pub const OUTPUT_MIME_TYPE: &str = "video/webm";

/// Encoder mime types, most preferred first
pub const CODEC_PREFERENCES: &[&str] = &[
    "video/webm; codecs=vp9",
    "video/webm; codecs=vp8",
    "video/webm",
];

/// Interval at which the encoder emits chunks
pub const CHUNK_INTERVAL: Duration = Duration::from_secs(1);

/// First supported codec, or `None` to let the encoder choose.
pub fn pick_mime_type(is_supported: impl Fn(&str) -> bool) -> Option<&'static str> {
    CODEC_PREFERENCES
        .iter()
        .copied()
        .find(|candidate| is_supported(candidate))
}

/// Ordered, append-only sequence of non-empty encoded chunks
#[derive(Debug, Default)]
pub struct ChunkSequence {
    chunks: Vec<Vec<u8>>,
}

impl ChunkSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Zero-length chunks are discarded and `false` is returned.
    pub fn push(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Concatenate every chunk, in order, into one container blob
    pub fn into_blob(self) -> ContainerBlob {
        let mut bytes = Vec::with_capacity(self.total_bytes());
        for chunk in self.chunks {
            bytes.extend_from_slice(&chunk);
        }
        ContainerBlob {
            mime_type: OUTPUT_MIME_TYPE,
            bytes,
        }
    }
}

/// A finished recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerBlob {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ContainerBlob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Get human-readable size string
    pub fn human_readable_size(&self) -> String {
        human_readable_size(self.bytes.len())
    }
}

/// Format a byte count as B, KB or MB
pub fn human_readable_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
