use crate::Error;
use lopdf::{Document, Object};

pub(crate) trait PdfObjectDeref {
    fn deref<'a>(&'a self, doc: &'a Document) -> Result<&'a Object, Error>;

    /// Read an `Integer` or `Real` (after following a reference) as `f64`.
    fn as_number(&self, doc: &Document) -> Result<f64, Error>;
}

impl PdfObjectDeref for Object {
    fn deref<'a>(&'a self, doc: &'a Document) -> Result<&'a Object, Error> {
        match *self {
            Object::Reference(oid) => doc
                .objects
                .get(&oid)
                .ok_or_else(|| Error::Other(format!("PDF Error: NoSuchReference({:#?})", oid))),
            _ => Ok(self),
        }
    }

    fn as_number(&self, doc: &Document) -> Result<f64, Error> {
        match *self.deref(doc)? {
            Object::Integer(value) => Ok(value as f64),
            Object::Real(value) => Ok(value as f64),
            _ => Err(Error::LoPdfError(lopdf::Error::Type)),
        }
    }
}
