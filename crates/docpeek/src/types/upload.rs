//! Uploaded file as received from the transport layer

use bytes::Bytes;

/// A named byte blob from one upload request
///
/// Immutable once received. The bytes are reference counted, so handing a
/// file to a blocking worker does not copy the upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as supplied by the client
    pub name: String,
    /// Raw file content
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Create an uploaded file
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Size of the content in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the content is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
