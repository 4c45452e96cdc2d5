use crate::document::SignableDocument;
use crate::options::SigningOptions;
use crate::placement::SignaturePosition;
use crate::stamper::{serialize, stamp_image, stamp_payload, stamp_text, SignaturePayload};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Unloaded,
    Loaded,
    Mutated,
    Serialized,
}

#[derive(Debug)]
enum Slot {
    Empty,
    Loaded(SignableDocument),
    Mutated(SignableDocument),
    Serialized,
}

/// Signs one document per request: `load`, then one `add_signature` or
/// `add_text_signature` call that also returns the written file.
///
/// After the bytes are returned the service is done; build a new one for the
/// next request. A failed call leaves the loaded document untouched, so it
/// can be retried with a corrected payload.
#[derive(Debug)]
pub struct SigningService {
    slot: Slot,
    options: SigningOptions,
}

impl Default for SigningService {
    fn default() -> Self {
        SigningService::new(SigningOptions::default())
    }
}

impl SigningService {
    pub fn new(options: SigningOptions) -> Self {
        SigningService {
            slot: Slot::Empty,
            options,
        }
    }

    pub fn state(&self) -> ServiceState {
        match self.slot {
            Slot::Empty => ServiceState::Unloaded,
            Slot::Loaded(_) => ServiceState::Loaded,
            Slot::Mutated(_) => ServiceState::Mutated,
            Slot::Serialized => ServiceState::Serialized,
        }
    }

    pub fn options(&self) -> &SigningOptions {
        &self.options
    }

    pub fn document(&self) -> Option<&SignableDocument> {
        match &self.slot {
            Slot::Loaded(document) | Slot::Mutated(document) => Some(document),
            Slot::Empty | Slot::Serialized => None,
        }
    }

    /// Parse the file. On failure the service stays (or becomes) unloaded.
    pub fn load(&mut self, bytes: impl Into<Vec<u8>>) -> Result<(), Error> {
        if let Slot::Serialized = self.slot {
            return Err(Error::Precondition(
                "the document was already signed and written".to_owned(),
            ));
        }
        self.slot = Slot::Empty;
        self.options.validate()?;
        let document = SignableDocument::load(bytes)?;
        self.slot = Slot::Loaded(document);
        Ok(())
    }

    /// Stamp a PNG or JPEG data URI signature and return the complete signed file.
    pub fn add_signature(
        &mut self,
        signature_data_uri: &str,
        position: &SignaturePosition,
    ) -> Result<Vec<u8>, Error> {
        self.stamp_signature(signature_data_uri, position)?;
        self.export()
    }

    /// Stamp a line of text and return the complete signed file.
    /// Without `font_size` the configured default (12) is used.
    pub fn add_text_signature(
        &mut self,
        text: &str,
        position: &SignaturePosition,
        font_size: Option<f32>,
    ) -> Result<Vec<u8>, Error> {
        self.stamp_text_signature(text, position, font_size)?;
        self.export()
    }

    /// `add_signature` or `add_text_signature`, depending on the payload.
    pub fn sign(
        &mut self,
        payload: &SignaturePayload,
        position: &SignaturePosition,
    ) -> Result<Vec<u8>, Error> {
        let options = &self.options;
        Self::mutate(&mut self.slot, |document| {
            stamp_payload(document, payload, position, options)
        })?;
        self.export()
    }

    /// Stamp an image signature without writing the file, for documents
    /// that need more than one signature. Finish with `export`.
    pub fn stamp_signature(
        &mut self,
        signature_data_uri: &str,
        position: &SignaturePosition,
    ) -> Result<(), Error> {
        let options = &self.options;
        Self::mutate(&mut self.slot, |document| {
            stamp_image(document, signature_data_uri, position, options)
        })
    }

    pub fn stamp_text_signature(
        &mut self,
        text: &str,
        position: &SignaturePosition,
        font_size: Option<f32>,
    ) -> Result<(), Error> {
        let options = &self.options;
        Self::mutate(&mut self.slot, |document| {
            stamp_text(document, text, position, font_size, options)
        })
    }

    /// Write the signed document. Only allowed after at least one signature.
    pub fn export(&mut self) -> Result<Vec<u8>, Error> {
        let document = match std::mem::replace(&mut self.slot, Slot::Serialized) {
            Slot::Mutated(document) => document,
            previous => {
                let state = match previous {
                    Slot::Loaded(_) => "no signature was added yet",
                    Slot::Serialized => "the document was already signed and written",
                    _ => "no document is loaded, call `load` first",
                };
                self.slot = previous;
                return Err(Error::Precondition(state.to_owned()));
            }
        };
        serialize(document, &self.options).map_err(|err| {
            // The document is gone, only a new `load` can continue.
            self.slot = Slot::Empty;
            err
        })
    }

    /// `Loaded`/`Mutated` -> `Mutated` when `change` succeeds, unchanged otherwise.
    fn mutate<F>(slot: &mut Slot, change: F) -> Result<(), Error>
    where
        F: FnOnce(&mut SignableDocument) -> Result<(), Error>,
    {
        match slot {
            Slot::Loaded(document) | Slot::Mutated(document) => change(document)?,
            Slot::Empty => {
                return Err(Error::Precondition(
                    "no document is loaded, call `load` first".to_owned(),
                ))
            }
            Slot::Serialized => {
                return Err(Error::Precondition(
                    "the document was already signed and written".to_owned(),
                ))
            }
        }
        *slot = match std::mem::replace(slot, Slot::Empty) {
            Slot::Loaded(document) | Slot::Mutated(document) => Slot::Mutated(document),
            other => other,
        };
        Ok(())
    }
}
