//! `multipart/form-data` bodies for the two image upload endpoints.

use uuid::Uuid;

/// Form field the server reads the uploaded file from.
pub const FILE_FIELD: &str = "file";

/// A file to upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Encode as a single-part form with a fresh random boundary.
    ///
    /// Returns the `Content-Type` header value and the body.
    pub fn to_multipart(&self) -> (String, Vec<u8>) {
        let boundary = format!("photo-core-{}", Uuid::new_v4().simple());
        let body = self.encode(&boundary);
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    fn encode(&self, boundary: &str) -> Vec<u8> {
        let file_name = self.file_name.replace('"', "%22");
        let mut body = Vec::with_capacity(self.bytes.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{FILE_FIELD}\"; filename=\"{file_name}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", self.content_type).as_bytes());
        body.extend_from_slice(&self.bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }
}
