use crate::options::SigningOptions;
use crate::placement::SignaturePosition;
use crate::service::SigningService;
use crate::Error;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A signed document ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBlob {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
}

impl SignedBlob {
    fn pdf(data: Vec<u8>) -> Self {
        SignedBlob {
            data,
            mime_type: PDF_MIME_TYPE,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Snapshot of the facade state for a UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacadeStatus {
    pub busy: bool,
    pub last_error: Option<String>,
}

/// Request level entry point for a UI.
///
/// Every call builds its own `SigningService`. Errors never leave this type:
/// a failed call returns `None` and keeps a message for display in
/// `last_error`. The busy flag is only informative, calls are not blocked
/// while another one runs.
#[derive(Debug, Default)]
pub struct SigningFacade {
    options: SigningOptions,
    busy: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl SigningFacade {
    pub fn new(options: SigningOptions) -> Self {
        SigningFacade {
            options,
            busy: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error_slot().clone()
    }

    pub fn status(&self) -> FacadeStatus {
        FacadeStatus {
            busy: self.is_busy(),
            last_error: self.last_error(),
        }
    }

    /// Stamp an image signature (PNG or JPEG data URI) on `file`.
    pub fn process_document(
        &self,
        file: &[u8],
        signature_data_uri: &str,
        position: &SignaturePosition,
    ) -> Option<SignedBlob> {
        self.run(|service| {
            service.load(file)?;
            service.add_signature(signature_data_uri, position)
        })
    }

    /// Stamp `text` on `file` with the default font size.
    pub fn process_text_signature(
        &self,
        file: &[u8],
        text: &str,
        position: &SignaturePosition,
    ) -> Option<SignedBlob> {
        self.process_text_signature_with_size(file, text, position, None)
    }

    pub fn process_text_signature_with_size(
        &self,
        file: &[u8],
        text: &str,
        position: &SignaturePosition,
        font_size: Option<f32>,
    ) -> Option<SignedBlob> {
        self.run(|service| {
            service.load(file)?;
            service.add_text_signature(text, position, font_size)
        })
    }

    fn run<F>(&self, request: F) -> Option<SignedBlob>
    where
        F: FnOnce(&mut SigningService) -> Result<Vec<u8>, Error>,
    {
        self.busy.store(true, Ordering::SeqCst);
        *self.last_error_slot() = None;

        let mut service = SigningService::new(self.options.clone());
        // Malformed input can make the pdf parser panic, that is reported like any other error.
        let result = panic::catch_unwind(AssertUnwindSafe(|| request(&mut service)))
            .unwrap_or_else(|_| {
                Err(Error::Other(
                    "The PDF document could not be processed.".to_owned(),
                ))
            });

        let blob = match result {
            Ok(data) => Some(SignedBlob::pdf(data)),
            Err(err) => {
                log::error!("Signing request failed: {}", err);
                *self.last_error_slot() = Some(err.to_string());
                None
            }
        };
        self.busy.store(false, Ordering::SeqCst);
        blob
    }

    fn last_error_slot(&self) -> MutexGuard<'_, Option<String>> {
        // A poisoned lock only means another request panicked, the message is still usable.
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
