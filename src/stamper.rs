use crate::document::SignableDocument;
use crate::options::SigningOptions;
use crate::placement::{self, SignaturePosition};
use crate::signature_image::SignatureImage;
use crate::text_signature::encode_win_ansi;
use crate::Error;
use serde::{Deserialize, Serialize};

/// What to stamp on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SignaturePayload {
    /// PNG or JPEG base64 data URI.
    #[serde(rename_all = "camelCase")]
    Image { data_uri: String },
    /// One line of text, `font_size` falls back to the configured default.
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        #[serde(default)]
        font_size: Option<f32>,
    },
}

pub(crate) fn stamp_payload(
    document: &mut SignableDocument,
    payload: &SignaturePayload,
    position: &SignaturePosition,
    options: &SigningOptions,
) -> Result<(), Error> {
    match payload {
        SignaturePayload::Image { data_uri } => stamp_image(document, data_uri, position, options),
        SignaturePayload::Text { text, font_size } => {
            stamp_text(document, text, position, *font_size, options)
        }
    }
}

/// Stamp an image signature: parse the data URI, resolve the page, embed, draw.
///
/// Nothing is changed when an error is returned: the work is done on a copy
/// of the document that only replaces it on success.
pub(crate) fn stamp_image(
    document: &mut SignableDocument,
    signature_data_uri: &str,
    position: &SignaturePosition,
    options: &SigningOptions,
) -> Result<(), Error> {
    let image = SignatureImage::from_data_uri(signature_data_uri)?;
    let placement = placement::resolve(document, position, options.bounds)?;

    let mut working_document = document.clone();
    let handle = working_document.embed_image(&image, options)?;
    working_document.draw_image(&handle, &placement)?;
    *document = working_document;

    log::info!(
        "Stamped {} signature on page {}.",
        image.format().mime_type(),
        placement.page.index
    );
    Ok(())
}

/// Stamp a text signature, with the same all or nothing behavior as `stamp_image`.
pub(crate) fn stamp_text(
    document: &mut SignableDocument,
    text: &str,
    position: &SignaturePosition,
    font_size: Option<f32>,
    options: &SigningOptions,
) -> Result<(), Error> {
    if text.trim().is_empty() {
        return Err(Error::Other("Text signature must not be empty.".to_owned()));
    }
    // Unencodable text fails before the document is copied.
    encode_win_ansi(text)?;
    let font_size = font_size.unwrap_or(options.default_font_size);
    let placement = placement::resolve(document, position, options.bounds)?;

    let mut working_document = document.clone();
    working_document.draw_text(text, &placement, font_size, options.text_color)?;
    *document = working_document;

    log::info!(
        "Stamped text signature ({} characters) on page {}.",
        text.chars().count(),
        placement.page.index
    );
    Ok(())
}

/// Write the document, applying the options that only matter on output.
pub(crate) fn serialize(
    mut document: SignableDocument,
    options: &SigningOptions,
) -> Result<Vec<u8>, Error> {
    if options.record_modification_date {
        document.record_modification(&options.producer)?;
    }
    document.into_bytes()
}

/// Applies any number of signatures to one document and writes it once.
///
/// ```no_run
/// # fn main() -> Result<(), pdf_stamping::Error> {
/// use pdf_stamping::{SignaturePosition, Stamper, SigningOptions};
///
/// let pdf = std::fs::read("contract.pdf")?;
/// let mut stamper = Stamper::load(pdf, SigningOptions::default())?;
/// stamper
///     .add_text("Jane Doe", &SignaturePosition::new(72.0, 90.0, 0.0, 0.0, 0), Some(14.0))?
///     .add_text("Initials: JD", &SignaturePosition::new(72.0, 40.0, 0.0, 0.0, 1), None)?;
/// let signed = stamper.finish()?;
/// # let _ = signed;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Stamper {
    document: SignableDocument,
    options: SigningOptions,
}

impl Stamper {
    pub fn new(document: SignableDocument, options: SigningOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Stamper { document, options })
    }

    pub fn load(bytes: impl Into<Vec<u8>>, options: SigningOptions) -> Result<Self, Error> {
        Self::new(SignableDocument::load(bytes)?, options)
    }

    pub fn document(&self) -> &SignableDocument {
        &self.document
    }

    pub fn add_image(
        &mut self,
        signature_data_uri: &str,
        position: &SignaturePosition,
    ) -> Result<&mut Self, Error> {
        stamp_image(&mut self.document, signature_data_uri, position, &self.options)?;
        Ok(self)
    }

    pub fn add_text(
        &mut self,
        text: &str,
        position: &SignaturePosition,
        font_size: Option<f32>,
    ) -> Result<&mut Self, Error> {
        stamp_text(&mut self.document, text, position, font_size, &self.options)?;
        Ok(self)
    }

    pub fn add(
        &mut self,
        payload: &SignaturePayload,
        position: &SignaturePosition,
    ) -> Result<&mut Self, Error> {
        stamp_payload(&mut self.document, payload, position, &self.options)?;
        Ok(self)
    }

    /// Write the signed document. Consumes the stamper.
    pub fn finish(self) -> Result<Vec<u8>, Error> {
        serialize(self.document, &self.options)
    }
}
