//! Conversion between on-screen page previews and pdf page coordinates.
//!
//! A UI renders a page into a viewport (pixels, origin top-left) while
//! signatures are placed in page units (points, origin bottom-left of the
//! `MediaBox`). The signing pipeline itself never converts, it expects
//! page units.

use crate::page::Page;
use crate::placement::SignaturePosition;
use crate::Error;
use serde::{Deserialize, Serialize};

/// Size of the rendered page on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Rectangle on the rendered page, origin top-left, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

fn scale(viewport: &Viewport, page: &Page) -> Result<(f64, f64), Error> {
    let valid = |value: f64| value.is_finite() && value > 0.0;
    if !valid(viewport.width) || !valid(viewport.height) {
        return Err(Error::InvalidPosition(format!(
            "viewport must have a positive size, got {}x{}",
            viewport.width, viewport.height
        )));
    }
    if !valid(page.width()) || !valid(page.height()) {
        return Err(Error::InvalidPosition(format!(
            "page {} has an empty MediaBox",
            page.index
        )));
    }
    Ok((
        page.width() / viewport.width,
        page.height() / viewport.height,
    ))
}

/// Convert a rectangle drawn on the page preview to a signature position on `page`.
pub fn screen_to_page(
    rect: &ScreenRect,
    viewport: &Viewport,
    page: &Page,
) -> Result<SignaturePosition, Error> {
    let (scale_x, scale_y) = scale(viewport, page)?;
    let media_box = page.media_box;
    // Flip the y axis: the bottom edge on screen becomes the origin in the pdf.
    let bottom = viewport.height - (rect.y + rect.height);
    Ok(SignaturePosition {
        x: media_box.x1 + rect.x * scale_x,
        y: media_box.y1 + bottom * scale_y,
        width: rect.width * scale_x,
        height: rect.height * scale_y,
        page_index: page.index as i64,
    })
}

/// Convert a signature position back to the page preview, e.g. to show existing signatures.
pub fn page_to_screen(
    position: &SignaturePosition,
    viewport: &Viewport,
    page: &Page,
) -> Result<ScreenRect, Error> {
    let (scale_x, scale_y) = scale(viewport, page)?;
    let media_box = page.media_box;
    let width = position.width / scale_x;
    let height = position.height / scale_y;
    let bottom = (position.y - media_box.y1) / scale_y;
    Ok(ScreenRect {
        x: (position.x - media_box.x1) / scale_x,
        y: viewport.height - bottom - height,
        width,
        height,
    })
}
