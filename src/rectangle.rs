use crate::pdf_object::PdfObjectDeref;
use crate::Error;
use lopdf::{Document, Object};

/// Rectangle in pdf user space, stored as two corners (like a pdf `Rect` array).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    /// US Letter, used when a page tree has no `MediaBox` at all.
    pub const LETTER: Rectangle = Rectangle {
        x1: 0.0,
        y1: 0.0,
        x2: 612.0,
        y2: 792.0,
    };

    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rectangle {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    /// Parse a pdf rectangle array `[llx lly urx ury]`.
    /// Corners are normalized so that `x1 <= x2` and `y1 <= y2`.
    pub(crate) fn from_pdf_array(obj: &Object, doc: &Document) -> Result<Self, Error> {
        let array = obj.deref(doc)?.as_array()?;
        if array.len() != 4 {
            return Err(Error::Other(format!(
                "Rectangle has {} elements, expected 4.",
                array.len()
            )));
        }
        let a = array[0].as_number(doc)?;
        let b = array[1].as_number(doc)?;
        let c = array[2].as_number(doc)?;
        let d = array[3].as_number(doc)?;
        Ok(Rectangle {
            x1: a.min(c),
            y1: b.min(d),
            x2: a.max(c),
            y2: b.max(d),
        })
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Same rectangle with corners ordered, so negative sizes are handled.
    pub fn normalized(&self) -> Self {
        Rectangle {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn contains(&self, other: &Rectangle) -> bool {
        let other = other.normalized();
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    /// Overlapping part of both rectangles, `None` when they do not overlap.
    /// Rectangles that only share an edge do not overlap, unless `other` is degenerate.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let other = other.normalized();
        let result = Rectangle {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        if result.x1 > result.x2 || result.y1 > result.y2 {
            return None;
        }
        let degenerate = other.width() == 0.0 || other.height() == 0.0;
        if !degenerate && (result.x1 == result.x2 || result.y1 == result.y2) {
            return None;
        }
        Some(result)
    }

    /// `[x y width height]` operands for the `re` operator.
    pub(crate) fn to_re_operands(self) -> Vec<Object> {
        vec![
            self.x1.into(),
            self.y1.into(),
            self.width().into(),
            self.height().into(),
        ]
    }
}
