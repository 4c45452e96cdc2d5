//! Low level page tree access and page content insertion on top of `lopdf::Document`.

use crate::pdf_object::PdfObjectDeref;
use crate::rectangle::Rectangle;
use crate::Error;
use lopdf::{
    content::{Content, Operation},
    Dictionary, Document, Object, ObjectId, Stream,
};

/// Max number of `Parent` links followed. Guards against cyclic page trees.
const MAX_PAGE_TREE_DEPTH: usize = 64;

pub(crate) trait PageTree {
    /// Look up an inheritable page attribute (`Resources`, `MediaBox`, ...)
    /// on the page or its ancestors. References are followed once.
    fn inherited_page_attribute(
        &self,
        page_id: ObjectId,
        key: &[u8],
    ) -> Result<Option<&Object>, Error>;
}

impl PageTree for Document {
    fn inherited_page_attribute(
        &self,
        page_id: ObjectId,
        key: &[u8],
    ) -> Result<Option<&Object>, Error> {
        let mut node_id = page_id;
        for _ in 0..MAX_PAGE_TREE_DEPTH {
            let node = self.get_object(node_id)?.as_dict()?;
            if let Ok(value) = node.get(key) {
                return Ok(Some(value.deref(self)?));
            }
            match node.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent_id) => node_id = parent_id,
                Err(_) => return Ok(None),
            }
        }
        Err(Error::Other("Page tree is too deep or contains a cycle.".to_owned()))
    }
}

pub(crate) trait InsertToPage: PageTree {
    fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId;

    fn page_dictionary_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, Error>;

    fn object(&self, object_id: ObjectId) -> Result<&Object, Error>;

    /// Add `object_id` to the `category` (`XObject`, `Font`) resources of a page
    /// and return the name it can be used with in the page content.
    ///
    /// The effective (possibly inherited or shared) resources are copied into a
    /// direct dictionary on the page, so other pages never see the new entry.
    /// When the object is already listed, the existing name is reused.
    fn register_page_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name_prefix: &str,
        object_id: ObjectId,
    ) -> Result<String, Error> {
        let mut resources = match self.inherited_page_attribute(page_id, b"Resources")? {
            Some(Object::Dictionary(dict)) => dict.clone(),
            Some(_) => {
                return Err(Error::Other(
                    "Page `Resources` is not a dictionary.".to_owned(),
                ))
            }
            None => Dictionary::new(),
        };
        let mut entries = match resources.get(category.as_bytes()) {
            Ok(obj) => match obj {
                Object::Reference(id) => self.object(*id)?.as_dict()?.clone(),
                _ => obj.as_dict()?.clone(),
            },
            Err(_) => Dictionary::new(),
        };

        let existing = entries.iter().find_map(|(name, value)| match value {
            Object::Reference(id) if *id == object_id => {
                Some(String::from_utf8_lossy(name).into_owned())
            }
            _ => None,
        });
        let name = match existing {
            Some(name) => name,
            None => {
                let mut counter = 1;
                let name = loop {
                    let candidate = format!("{}{}", name_prefix, counter);
                    if !entries.has(candidate.as_bytes()) {
                        break candidate;
                    }
                    counter += 1;
                };
                entries.set(name.clone(), Object::Reference(object_id));
                name
            }
        };

        resources.set(category, Object::Dictionary(entries));
        self.page_dictionary_mut(page_id)?
            .set("Resources", Object::Dictionary(resources));
        Ok(name)
    }

    /// Append a content stream to the page, drawn on top of everything else.
    ///
    /// Existing content is wrapped in `q`/`Q` so a graphics state it leaves
    /// behind (e.g. a transformation matrix) does not affect the new content.
    /// The existing streams are left untouched.
    fn append_page_content(
        &mut self,
        page_id: ObjectId,
        content: Content<Vec<Operation>>,
    ) -> Result<(), Error> {
        let existing = {
            let page = self.object(page_id)?.as_dict()?;
            match page.get(b"Contents") {
                Ok(Object::Reference(id)) => match self.object(*id)? {
                    Object::Array(list) => list.clone(),
                    _ => vec![Object::Reference(*id)],
                },
                Ok(Object::Array(list)) => list.clone(),
                _ => Vec::new(),
            }
        };

        let mut contents = Vec::with_capacity(existing.len() + 2);
        let mut data = Vec::new();
        if !existing.is_empty() {
            let save_id = self.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            contents.push(Object::Reference(save_id));
            contents.extend(existing);
            // Content streams are concatenated without separator.
            data.extend_from_slice(b"\nQ\n");
        }
        data.extend(content.encode()?);
        let stamp_id = self.add_object(Stream::new(Dictionary::new(), data));
        contents.push(Object::Reference(stamp_id));

        self.page_dictionary_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    /// Draw an image XObject that is already registered on the page.
    /// The unit square of the image is mapped onto `rect`.
    fn add_image_to_page_stream(
        &mut self,
        xobject_name: &str,
        page_id: ObjectId,
        rect: Rectangle,
        clip: Option<Rectangle>,
    ) -> Result<(), Error> {
        use lopdf::Object::*;
        let mut content = Content {
            operations: Vec::<Operation>::new(),
        };
        let position = (rect.x1, rect.y1);
        let size = (rect.width(), rect.height());
        // The following lines use commands: see p643 (Table A.1) for more info
        // `q` = Save graphics state
        content.operations.push(Operation::new("q", vec![]));
        push_clip(&mut content, clip);
        // `cm` = Concatenate matrix to current transformation matrix
        content.operations.push(Operation::new(
            "cm",
            vec![
                size.0.into(),
                0i32.into(),
                0i32.into(),
                size.1.into(),
                position.0.into(),
                position.1.into(),
            ],
        ));
        // `Do` = Invoke named XObject
        content.operations.push(Operation::new(
            "Do",
            vec![Name(xobject_name.as_bytes().to_vec())],
        ));
        // `Q` = Restore graphics state
        content.operations.push(Operation::new("Q", vec![]));

        self.append_page_content(page_id, content)
    }

    /// Show a single line of text with its baseline starting at `origin`.
    /// `text` must already be encoded for the font.
    #[allow(clippy::too_many_arguments)]
    fn add_text_to_page_stream(
        &mut self,
        font_name: &str,
        page_id: ObjectId,
        text: Vec<u8>,
        origin: (f64, f64),
        font_size: f32,
        color: [f32; 3],
        clip: Option<Rectangle>,
    ) -> Result<(), Error> {
        use lopdf::{Object::*, StringFormat};
        let mut content = Content {
            operations: Vec::<Operation>::new(),
        };
        content.operations.push(Operation::new("q", vec![]));
        push_clip(&mut content, clip);
        // `rg` = Set fill color (RGB)
        content.operations.push(Operation::new(
            "rg",
            color.iter().map(|c| Real(*c)).collect(),
        ));
        // `BT`/`ET` = Begin/End text object
        content.operations.push(Operation::new("BT", vec![]));
        // `Tf` = Select font and size
        content.operations.push(Operation::new(
            "Tf",
            vec![Name(font_name.as_bytes().to_vec()), Real(font_size)],
        ));
        // `Td` = Move to start of the line
        content
            .operations
            .push(Operation::new("Td", vec![origin.0.into(), origin.1.into()]));
        // `Tj` = Show text
        content.operations.push(Operation::new(
            "Tj",
            vec![String(text, StringFormat::Literal)],
        ));
        content.operations.push(Operation::new("ET", vec![]));
        content.operations.push(Operation::new("Q", vec![]));

        self.append_page_content(page_id, content)
    }
}

/// `re W n`: intersect the clipping path with `clip`.
fn push_clip(content: &mut Content<Vec<Operation>>, clip: Option<Rectangle>) {
    if let Some(clip) = clip {
        content
            .operations
            .push(Operation::new("re", clip.to_re_operands()));
        content.operations.push(Operation::new("W", vec![]));
        content.operations.push(Operation::new("n", vec![]));
    }
}

impl InsertToPage for Document {
    fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        Document::add_object(self, object)
    }

    fn page_dictionary_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, Error> {
        Ok(self.get_object_mut(page_id)?.as_dict_mut()?)
    }

    fn object(&self, object_id: ObjectId) -> Result<&Object, Error> {
        Ok(self.get_object(object_id)?)
    }
}
