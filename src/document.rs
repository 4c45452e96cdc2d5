use crate::image_xobject::ImageXObject;
use crate::options::{validate_font_size, SigningOptions};
use crate::page::Page;
use crate::page_content::InsertToPage;
use crate::placement::Placement;
use crate::signature_image::{ImageFormat, ImageHandle, SignatureImage};
use crate::text_signature::{decode_win_ansi, encode_win_ansi, helvetica_font, shown_strings};
use crate::Error;
use chrono::Utc;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A loaded pdf that signatures can be stamped on.
///
/// The original bytes are kept as they were, every change is made to the
/// parsed document and only becomes visible through [`SignableDocument::into_bytes`],
/// which writes a complete new file.
#[derive(Debug, Clone)]
pub struct SignableDocument {
    /// Identifies the document for `ImageHandle`s. Clones share it.
    id: u64,
    raw_document: Document,
    /// Shared by clones, stamping works on a copy of the parsed document only.
    original_bytes: Arc<[u8]>,
    /// Link between the hash of the image saved and its handle.
    /// This is used to reduce the amount of copies of the images in the pdf file.
    image_handles: HashMap<Vec<u8>, ImageHandle>,
    font_object_id: Option<ObjectId>,
}

impl SignableDocument {
    /// Parse a pdf file. Malformed, non pdf or encrypted input is a `Load` error.
    pub fn load(bytes: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let original_bytes: Vec<u8> = bytes.into();
        let raw_document =
            Document::load_mem(&original_bytes).map_err(|err| Error::Load(err.to_string()))?;
        if raw_document.trailer.get(b"Encrypt").is_ok() {
            log::warn!("Refusing to load an encrypted document.");
            return Err(Error::Load("the document is encrypted".to_owned()));
        }
        let document = SignableDocument {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            raw_document,
            original_bytes: Arc::from(original_bytes),
            image_handles: HashMap::new(),
            font_object_id: None,
        };
        log::debug!(
            "Loaded PDF {} ({} bytes, {} pages).",
            document.raw_document.version,
            document.original_bytes.len(),
            document.page_count()
        );
        Ok(document)
    }

    /// The bytes this document was loaded from, never modified.
    pub fn original_bytes(&self) -> &[u8] {
        &self.original_bytes
    }

    pub fn get_document_ref(&self) -> &Document {
        &self.raw_document
    }

    pub fn page_count(&self) -> usize {
        self.raw_document.get_pages().len()
    }

    pub fn page(&self, index: usize) -> Result<Page, Error> {
        let page_count = self.page_count();
        let object_id = self
            .raw_document
            .get_pages()
            .values()
            .nth(index)
            .copied()
            .ok_or(Error::PageIndexOutOfRange {
                page_index: i64::try_from(index).unwrap_or(i64::MAX),
                page_count,
            })?;
        Page::read(&self.raw_document, index, object_id)
    }

    pub fn pages(&self) -> Result<Vec<Page>, Error> {
        self.raw_document
            .get_pages()
            .values()
            .enumerate()
            .map(|(index, object_id)| Page::read(&self.raw_document, index, *object_id))
            .collect()
    }

    /// Page lookup for a caller supplied (possibly negative) index. Never clamps.
    pub(crate) fn page_by_position_index(&self, page_index: i64) -> Result<Page, Error> {
        let out_of_range = || Error::PageIndexOutOfRange {
            page_index,
            page_count: self.page_count(),
        };
        let index = usize::try_from(page_index).map_err(|_| out_of_range())?;
        if index >= self.page_count() {
            return Err(out_of_range());
        }
        self.page(index)
    }

    /// Add the image to the document as an image XObject.
    /// The image is not visible until it is drawn on a page.
    ///
    /// Embedding the same image again returns the first handle.
    pub fn embed_image(
        &mut self,
        image: &SignatureImage,
        options: &SigningOptions,
    ) -> Result<ImageHandle, Error> {
        let digest = image.digest();
        if let Some(handle) = self.image_handles.get(&digest) {
            // Image was already added so we can reuse it.
            return Ok(*handle);
        }

        // Decode first, the document is only touched when the image is valid.
        let (mut image_xobject, mask_xobject) = match image.format() {
            ImageFormat::Png => ImageXObject::from_png(
                image.data(),
                options.compress_images,
                options.interpolate_images,
            )?,
            ImageFormat::Jpeg => (
                ImageXObject::from_jpeg(image.data(), options.interpolate_images)?,
                None,
            ),
        };
        let (width, height) = (image_xobject.width, image_xobject.height);
        if let Some(mask_xobject) = mask_xobject {
            let mask_xobject_id = self.raw_document.add_object(mask_xobject);
            image_xobject.s_mask = Some(mask_xobject_id);
        }
        let object_id = self.raw_document.add_object(image_xobject);

        let handle = ImageHandle {
            document_id: self.id,
            object_id,
            width,
            height,
        };
        self.image_handles.insert(digest, handle);
        log::debug!(
            "Embedded {}x{} {} signature as object `({},{})`.",
            width,
            height,
            image.format().mime_type(),
            object_id.0,
            object_id.1
        );
        Ok(handle)
    }

    /// Draw an embedded image so it fills the placement rectangle.
    pub fn draw_image(&mut self, handle: &ImageHandle, placement: &Placement) -> Result<(), Error> {
        if handle.document_id != self.id {
            return Err(Error::Precondition(
                "the image was embedded in another document".to_owned(),
            ));
        }
        self.check_placement(placement)?;
        let page_id = placement.page.object_id;
        let xobject_name = self.raw_document.register_page_resource(
            page_id,
            "XObject",
            "SigImage",
            handle.object_id,
        )?;
        self.raw_document
            .add_image_to_page_stream(&xobject_name, page_id, placement.rect, placement.clip)
    }

    /// Draw one line of Helvetica text, the baseline starts at the
    /// bottom-left corner of the placement rectangle.
    pub fn draw_text(
        &mut self,
        text: &str,
        placement: &Placement,
        font_size: f32,
        color: [f32; 3],
    ) -> Result<(), Error> {
        validate_font_size(font_size)?;
        let encoded_text = encode_win_ansi(text)?;
        self.check_placement(placement)?;
        let page_id = placement.page.object_id;
        let font_id = match self.font_object_id {
            Some(font_id) => font_id,
            None => {
                let font_id = self.raw_document.add_object(helvetica_font());
                self.font_object_id = Some(font_id);
                font_id
            }
        };
        let font_name =
            self.raw_document
                .register_page_resource(page_id, "Font", "SigFont", font_id)?;
        self.raw_document.add_text_to_page_stream(
            &font_name,
            page_id,
            encoded_text,
            (placement.rect.x1, placement.rect.y1),
            font_size,
            color,
            placement.clip,
        )
    }

    /// Strings shown on a page, one entry per text showing operator.
    /// Bytes are read as WinAnsiEncoding, whatever font the page uses.
    pub fn text_runs(&self, page_index: usize) -> Result<Vec<String>, Error> {
        let page = self.page(page_index)?;
        let content = self
            .raw_document
            .get_and_decode_page_content(page.object_id)?;
        Ok(content
            .operations
            .iter()
            .flat_map(|operation| shown_strings(&operation.operator, &operation.operands))
            .map(|bytes| decode_win_ansi(&bytes))
            .collect())
    }

    /// Set `ModDate` and `Producer` in the document info dictionary.
    pub fn record_modification(&mut self, producer: &str) -> Result<(), Error> {
        let now = Utc::now();
        let info_id = match self
            .raw_document
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
        {
            Ok(info_id) if self.raw_document.get_dictionary(info_id).is_ok() => info_id,
            _ => {
                let info_id = self.raw_document.add_object(Dictionary::new());
                self.raw_document.trailer.set("Info", Object::Reference(info_id));
                info_id
            }
        };
        let info = self.raw_document.get_object_mut(info_id)?.as_dict_mut()?;
        info.set(
            "ModDate",
            Object::string_literal(now.format("D:%Y%m%d%H%M%S+00'00'").to_string()),
        );
        info.set("Producer", Object::string_literal(producer));
        Ok(())
    }

    /// Write the complete document. The document can not be changed afterwards.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, Error> {
        let mut pdf_file_data: Vec<u8> = Vec::new();
        self.raw_document.save_to(&mut pdf_file_data)?;
        log::debug!(
            "Serialized signed document: {} bytes (original {} bytes).",
            pdf_file_data.len(),
            self.original_bytes.len()
        );
        Ok(pdf_file_data)
    }

    fn check_placement(&self, placement: &Placement) -> Result<(), Error> {
        let known_page = self
            .raw_document
            .get_pages()
            .values()
            .any(|page_id| *page_id == placement.page.object_id);
        if known_page {
            Ok(())
        } else {
            Err(Error::Precondition(
                "the placement was resolved against another document".to_owned(),
            ))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::placement::{resolve, BoundsMode, SignaturePosition};
    use lopdf::dictionary;
    use pretty_assertions::assert_eq;

    /// A single 200x100 page without content.
    pub(crate) fn one_page_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn clones_share_the_original_bytes() {
        let document = SignableDocument::load(one_page_pdf()).unwrap();
        let copy = document.clone();
        assert!(Arc::ptr_eq(&document.original_bytes, &copy.original_bytes));
        assert_eq!(copy.original_bytes(), one_page_pdf().as_slice());
    }

    #[test]
    fn unencodable_text_adds_nothing() {
        let mut document = SignableDocument::load(one_page_pdf()).unwrap();
        let placement = resolve(
            &document,
            &SignaturePosition::new(10.0, 10.0, 0.0, 0.0, 0),
            BoundsMode::Permissive,
        )
        .unwrap();
        let objects_before = document.raw_document.objects.len();
        let result = document.draw_text("张伟 Zhang", &placement, 12.0, [0.0; 3]);
        assert!(matches!(result, Err(Error::UnencodableText('张'))));
        assert_eq!(document.raw_document.objects.len(), objects_before);
        assert_eq!(document.font_object_id, None);
    }
}
