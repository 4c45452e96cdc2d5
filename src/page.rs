use crate::page_content::PageTree;
use crate::rectangle::Rectangle;
use crate::Error;
use lopdf::{Document, ObjectId};

/// One page of a loaded document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    /// Zero based index in the page tree.
    pub index: usize,
    pub object_id: ObjectId,
    /// Page coordinate space, origin bottom-left.
    pub media_box: Rectangle,
}

impl Page {
    pub(crate) fn read(doc: &Document, index: usize, object_id: ObjectId) -> Result<Self, Error> {
        let media_box = match doc.inherited_page_attribute(object_id, b"MediaBox")? {
            Some(obj) => Rectangle::from_pdf_array(obj, doc)?,
            None => {
                log::debug!("Page {} has no MediaBox, using US Letter.", index);
                Rectangle::LETTER
            }
        };
        Ok(Page {
            index,
            object_id,
            media_box,
        })
    }

    pub fn width(&self) -> f64 {
        self.media_box.width()
    }

    pub fn height(&self) -> f64 {
        self.media_box.height()
    }
}
