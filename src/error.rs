use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The input could not be parsed as a (non encrypted) pdf document.
    Load(String),
    /// The signature image is not a PNG or JPEG data URI.
    UnsupportedFormat(String),
    /// The requested page does not exist in the loaded document.
    PageIndexOutOfRange { page_index: i64, page_count: usize },
    /// An operation was called in a state where it is not allowed.
    Precondition(String),
    /// The signature position can not be written to the page.
    InvalidPosition(String),
    /// A typed signature contains a character the standard font can not show.
    UnencodableText(char),
    /// The signature rectangle leaves the page and the bounds mode does not allow it.
    OutOfBounds(String),
    LoPdfError(lopdf::Error),
    Base64Error(base64::DecodeError),
    PngError(png::DecodingError),
    ImageError(image::ImageError),
    ConfigError(serde_json::Error),
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Load(msg) => write!(f, "Could not load PDF document: {}", msg),
            Error::UnsupportedFormat(msg) => {
                write!(f, "Unsupported signature image format: {}", msg)
            }
            Error::PageIndexOutOfRange {
                page_index,
                page_count,
            } => write!(
                f,
                "Page index {} is out of range, the document has {} page(s).",
                page_index, page_count
            ),
            Error::Precondition(msg) => write!(f, "Invalid operation: {}", msg),
            Error::InvalidPosition(msg) => write!(f, "Invalid signature position: {}", msg),
            Error::UnencodableText(c) => write!(
                f,
                "Text signature contains `{}` (U+{:04X}), which WinAnsi cannot encode.",
                c, *c as u32
            ),
            Error::OutOfBounds(msg) => write!(f, "Signature is outside the page: {}", msg),
            Error::LoPdfError(err) => write!(f, "PDF error: {}", err),
            Error::Base64Error(err) => write!(f, "Invalid base64 image data: {}", err),
            Error::PngError(err) => write!(f, "Invalid PNG image: {}", err),
            Error::ImageError(err) => write!(f, "Invalid JPEG image: {}", err),
            Error::ConfigError(err) => write!(f, "Invalid signing options: {}", err),
            Error::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::LoPdfError(err) => Some(err),
            Error::Base64Error(err) => Some(err),
            Error::PngError(err) => Some(err),
            Error::ImageError(err) => Some(err),
            Error::ConfigError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Self::LoPdfError(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Error(err)
    }
}

impl From<png::DecodingError> for Error {
    fn from(err: png::DecodingError) -> Self {
        Self::PngError(err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Self::Other(err.to_owned())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::LoPdfError(lopdf::Error::from(err))
    }
}
