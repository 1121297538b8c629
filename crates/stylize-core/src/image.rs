//! Uploaded image handling: validation, format sniffing and base64 encoding.

use base64::Engine;

use crate::error::PipelineError;

/// Image format recognised from the leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Detect the format from the first bytes of a file.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(Self::Png);
        }

        // GIF: GIF8
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        // WebP: RIFF....WEBP
        if bytes.starts_with(b"RIFF") {
            return (bytes.len() >= 12 && &bytes[8..12] == b"WEBP").then_some(Self::Webp);
        }

        // BMP: BM
        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        None
    }

    /// MIME type sent to upstream APIs.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    /// File extension used when the client did not send a file name.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }
}

/// An image received from the browser, validated and ready to forward.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    file_name: String,
}

impl UploadedImage {
    /// Validate uploaded bytes.
    ///
    /// Checks, in order:
    /// - the upload is not empty
    /// - the upload is within `max_bytes`
    /// - the bytes carry a known image signature
    ///
    /// The declared content type is only used for logging; the sniffed
    /// format is what gets forwarded upstream.
    pub fn new(
        bytes: Vec<u8>,
        declared_content_type: Option<&str>,
        file_name: Option<&str>,
        max_bytes: u64,
    ) -> Result<Self, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::MissingInput("Image file is empty".to_string()));
        }

        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(PipelineError::FileTooLarge {
                size_kb: size / 1024,
                max_mb: max_bytes / (1024 * 1024),
            });
        }

        let format = ImageFormat::sniff(&bytes).ok_or_else(|| PipelineError::InvalidImage {
            message: "Unrecognized image format (invalid magic bytes)".to_string(),
        })?;

        if let Some(declared) = declared_content_type {
            if declared != format.media_type() {
                tracing::debug!(
                    "Declared content type '{declared}' differs from sniffed '{}'",
                    format.media_type()
                );
            }
        }

        let file_name = file_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("upload.{}", format.extension()));

        Ok(Self {
            bytes,
            format,
            file_name,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64-encode for inline submission to a vision model.
    pub fn to_input(&self) -> ImageInput {
        ImageInput {
            data: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
            media_type: self.media_type().to_string(),
        }
    }
}

/// Base64-encoded image ready to send to a vision API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}
