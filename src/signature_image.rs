//! Signature images as delivered by a drawing canvas or an upload: base64 data URIs.

use crate::Error;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lopdf::ObjectId;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// A decoded signature image, not yet part of any document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    format: ImageFormat,
    data: Vec<u8>,
}

impl SignatureImage {
    /// Parse `data:image/png;base64,....` (or `image/jpeg`).
    ///
    /// The media type is checked before anything is decoded, every other
    /// type (or a string that is not a base64 data URI) is an
    /// `UnsupportedFormat` error.
    pub fn from_data_uri(data_uri: &str) -> Result<Self, Error> {
        let data_uri = data_uri.trim();
        let rest = match data_uri.get(..5) {
            Some(scheme) if scheme.eq_ignore_ascii_case("data:") => &data_uri[5..],
            _ => {
                return Err(Error::UnsupportedFormat(
                    "signature is not a data URI".to_owned(),
                ))
            }
        };
        let (header, payload) = rest.split_once(',').ok_or_else(|| {
            Error::UnsupportedFormat("data URI has no `,` separator".to_owned())
        })?;

        let mut params = header.split(';');
        let mime_type = params.next().unwrap_or_default().trim();
        let format = ImageFormat::from_mime_type(mime_type).ok_or_else(|| {
            let shown = if mime_type.is_empty() {
                "<missing>"
            } else {
                mime_type
            };
            Error::UnsupportedFormat(format!(
                "`{}`, only image/png and image/jpeg are supported",
                shown
            ))
        })?;
        if !params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
            return Err(Error::UnsupportedFormat(
                "data URI is not base64 encoded".to_owned(),
            ));
        }

        // Long data URIs are sometimes wrapped.
        let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let data = STANDARD.decode(payload)?;
        log::debug!(
            "Decoded {} signature image of {} bytes.",
            format.mime_type(),
            data.len()
        );
        Ok(SignatureImage { format, data })
    }

    pub fn from_bytes(format: ImageFormat, data: Vec<u8>) -> Self {
        SignatureImage { format, data }
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Content hash, used to embed the same image only once per document.
    pub(crate) fn digest(&self) -> Vec<u8> {
        Sha256::digest(&self.data).to_vec()
    }
}

/// An image embedded in a specific `SignableDocument`.
/// Only valid for draw calls on that same document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    pub(crate) document_id: u64,
    pub(crate) object_id: ObjectId,
    pub width: u32,
    pub height: u32,
}
