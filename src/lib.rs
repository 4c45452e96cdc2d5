//! Stamp visible signatures on pdf documents.
//!
//! A user supplied pdf is loaded, a drawn/uploaded signature (PNG or JPEG data
//! URI) or a typed signature (text) is drawn in a rectangle on one of its
//! pages and the whole document is written to a new byte buffer.
//!
//! - [`SigningFacade`]: request level entry point for a UI, never returns errors,
//!   only `Option<SignedBlob>` plus a last error message.
//! - [`SigningService`]: one document per request, `load` then `add_signature`
//!   or `add_text_signature`.
//! - [`Stamper`]: several signatures on the same document, written once.
//! - [`SignableDocument`]: the loaded document with the embed and draw primitives.

pub mod coords;
mod document;
mod error;
mod facade;
mod image_xobject;
mod options;
mod page;
mod page_content;
mod pdf_object;
mod placement;
mod rectangle;
mod service;
mod signature_image;
mod stamper;
mod text_signature;

pub use document::SignableDocument;
pub use error::Error;
pub use facade::{FacadeStatus, SignedBlob, SigningFacade, PDF_MIME_TYPE};
pub use image_xobject::{ColorSpace, ImageFilter, ImageXObject};
pub use lopdf;
pub use options::{SigningOptions, DEFAULT_FONT_SIZE};
pub use page::Page;
pub use placement::{resolve as resolve_placement, BoundsMode, Placement, SignaturePosition};
pub use rectangle::Rectangle;
pub use service::{ServiceState, SigningService};
pub use signature_image::{ImageFormat, ImageHandle, SignatureImage};
pub use stamper::{SignaturePayload, Stamper};
pub use text_signature::{decode_win_ansi, encode_win_ansi};
