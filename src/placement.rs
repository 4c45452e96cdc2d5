use crate::document::SignableDocument;
use crate::page::Page;
use crate::rectangle::Rectangle;
use crate::Error;
use serde::{Deserialize, Serialize};

/// Where a signature goes: a rectangle in page units (origin bottom-left)
/// on the page with the zero based `page_index`.
///
/// The values are used as given, converting from screen pixels is the
/// caller's job (see [`crate::coords`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Signed so out of range values from a UI (e.g. `-1`) are reported, not wrapped.
    pub page_index: i64,
}

impl SignaturePosition {
    pub fn new(x: f64, y: f64, width: f64, height: f64, page_index: i64) -> Self {
        SignaturePosition {
            x,
            y,
            width,
            height,
            page_index,
        }
    }

    pub fn rectangle(&self) -> Rectangle {
        Rectangle::from_origin_size(self.x, self.y, self.width, self.height)
    }
}

/// What to do with a signature rectangle that is not inside the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsMode {
    /// Draw it anyway, whatever is outside the page is simply not visible.
    #[default]
    Permissive,
    /// Clip the drawing to the page. Fails when nothing would be visible.
    Clip,
    /// Fail unless the rectangle is completely inside the page.
    Reject,
}

/// A resolved signature position: the target page and the drawing rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: Page,
    pub rect: Rectangle,
    /// Clipping rectangle to apply while drawing, only set in `BoundsMode::Clip`.
    pub clip: Option<Rectangle>,
}

pub fn resolve(
    document: &SignableDocument,
    position: &SignaturePosition,
    bounds: BoundsMode,
) -> Result<Placement, Error> {
    let values = [
        ("x", position.x),
        ("y", position.y),
        ("width", position.width),
        ("height", position.height),
    ];
    if let Some((name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
        return Err(Error::InvalidPosition(format!(
            "`{}` must be a finite number, got `{}`",
            name, value
        )));
    }

    let page = document.page_by_position_index(position.page_index)?;
    let rect = position.rectangle();
    let media_box = page.media_box;

    let clip = match bounds {
        _ if media_box.contains(&rect) => None,
        BoundsMode::Permissive => {
            log::warn!(
                "Signature rectangle {:?} exceeds page {} ({:?}), drawing it anyway.",
                rect,
                page.index,
                media_box
            );
            None
        }
        BoundsMode::Clip => match media_box.intersection(&rect) {
            Some(_) => Some(media_box),
            None => {
                return Err(Error::OutOfBounds(format!(
                    "rectangle {:?} does not overlap page {} ({:?})",
                    rect, page.index, media_box
                )))
            }
        },
        BoundsMode::Reject => {
            return Err(Error::OutOfBounds(format!(
                "rectangle {:?} is not inside page {} ({:?})",
                rect, page.index, media_box
            )))
        }
    };

    log::debug!(
        "Resolved signature on page {} at {:?} (clip: {:?}).",
        page.index,
        rect,
        clip
    );
    Ok(Placement { page, rect, clip })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn position_uses_camel_case_json() {
        let position: SignaturePosition = serde_json::from_str(
            r#"{"x": 50, "y": 50, "width": 100, "height": 40, "pageIndex": 0}"#,
        )
        .unwrap();
        assert_eq!(position, SignaturePosition::new(50.0, 50.0, 100.0, 40.0, 0));
    }

    #[test]
    fn negative_page_index_is_kept() {
        let position: SignaturePosition = serde_json::from_str(
            r#"{"x": 0, "y": 0, "width": 0, "height": 0, "pageIndex": -1}"#,
        )
        .unwrap();
        assert_eq!(position.page_index, -1);
    }

    #[test]
    fn bounds_mode_names() {
        let mode: BoundsMode = serde_json::from_str(r#""clip""#).unwrap();
        assert_eq!(mode, BoundsMode::Clip);
        assert_eq!(BoundsMode::default(), BoundsMode::Permissive);
    }
}
