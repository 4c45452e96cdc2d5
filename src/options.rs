use crate::placement::BoundsMode;
use crate::Error;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Settings shared by every signature applied to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SigningOptions {
    /// Font size for text signatures that do not specify one.
    pub default_font_size: f32,
    pub bounds: BoundsMode,
    /// Flate compress the pixel data of PNG signatures.
    pub compress_images: bool,
    pub interpolate_images: bool,
    /// RGB fill color for text signatures, each channel in `0.0..=1.0`.
    pub text_color: [f32; 3],
    /// Set `ModDate` and `Producer` in the document info dictionary.
    /// Off by default, it makes the output depend on the clock.
    pub record_modification_date: bool,
    pub producer: String,
}

impl Default for SigningOptions {
    fn default() -> Self {
        SigningOptions {
            default_font_size: DEFAULT_FONT_SIZE,
            bounds: BoundsMode::default(),
            compress_images: true,
            interpolate_images: false,
            text_color: [0.0, 0.0, 0.0],
            record_modification_date: false,
            producer: concat!("pdf_stamping ", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl SigningOptions {
    /// Read options from JSON, missing keys keep their default.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: SigningOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_font_size(self.default_font_size)?;
        if self
            .text_color
            .iter()
            .any(|c| !c.is_finite() || !(0.0..=1.0).contains(c))
        {
            return Err(Error::Other(format!(
                "Text color channels must be between 0 and 1, got {:?}.",
                self.text_color
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_font_size(font_size: f32) -> Result<(), Error> {
    if font_size.is_finite() && font_size > 0.0 {
        Ok(())
    } else {
        Err(Error::Other(format!(
            "Font size must be a positive number, got `{}`.",
            font_size
        )))
    }
}
