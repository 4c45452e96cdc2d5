// This code is inspired by https://github.com/fschutt/printpdf/blob/2bebdc65d06dafbe926ed4b43fedd10f966c59d3/src/xobject.rs

use crate::Error;
use flate2::{write::ZlibEncoder, Compression};
use image::{codecs::jpeg::JpegDecoder, ColorType as JpegColorType, ImageDecoder};
use lopdf::ObjectId;
use png::{ColorType, Transformations};
use std::io::{Cursor, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
}

impl ColorSpace {
    fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRgb => "DeviceRGB",
            ColorSpace::DeviceCmyk => "DeviceCMYK",
        }
    }

    fn components(self) -> usize {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRgb => 3,
            ColorSpace::DeviceCmyk => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// zlib/deflate compressed samples.
    Flate,
    /// The image data is a complete JPEG file.
    Dct,
}

#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Width of the image (original width, not scaled width)
    pub width: u32,
    /// Height of the image (original height, not scaled height)
    pub height: u32,
    pub color_space: ColorSpace,
    /// Always 8, 16 bit images are stripped and small bit depths are expanded.
    pub bits_per_component: u8,
    /// Should the image be interpolated when scaled?
    pub interpolate: bool,
    /// The actual data from the image
    pub image_data: Vec<u8>,
    pub filter: Option<ImageFilter>,
    /// Adobe CMYK JPEGs store inverted samples.
    pub inverted: bool,
    /// Image used as a soft mask. (transparency)
    pub s_mask: Option<ObjectId>,
}

impl ImageXObject {
    /// Returns 1 or 2 images. The first is the color image.
    /// The second is (if present) the mask/alpha channel of the image.
    pub fn from_png(
        data: &[u8],
        compress: bool,
        interpolate: bool,
    ) -> Result<(Self, Option<Self>), Error> {
        let mut image_decoder = png::Decoder::new(Cursor::new(data));
        // Palettes and bit depths below 8 are expanded, 16 bit is stripped to 8.
        image_decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let mut image_reader = image_decoder.read_info()?;
        let (color_type, _) = image_reader.output_color_type();
        // Allocate the output buffer.
        let mut buf = vec![0; image_reader.output_buffer_size()];
        // Read the next frame. An APNG might contain multiple frames.
        let info = image_reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        let (color_space, image_color_data, alpha_data) = match color_type {
            ColorType::Rgba => {
                let (color, alpha) = Self::split_alpha_channel(&buf, 3);
                (ColorSpace::DeviceRgb, color, Some(alpha))
            }
            ColorType::GrayscaleAlpha => {
                let (color, alpha) = Self::split_alpha_channel(&buf, 1);
                (ColorSpace::DeviceGray, color, Some(alpha))
            }
            ColorType::Rgb => (ColorSpace::DeviceRgb, buf, None),
            ColorType::Grayscale => (ColorSpace::DeviceGray, buf, None),
            ColorType::Indexed => {
                return Err(Error::Other(
                    "PNG palette was not expanded by the decoder.".to_owned(),
                ))
            }
        };
        // A fully opaque alpha channel does not need a mask.
        let alpha_data = alpha_data.filter(|alpha| alpha.iter().any(|a| *a != u8::MAX));

        let image = Self::raw(
            info.width,
            info.height,
            color_space,
            image_color_data,
            compress,
            interpolate,
        )?;
        let mask = alpha_data
            .map(|alpha| {
                Self::raw(
                    info.width,
                    info.height,
                    ColorSpace::DeviceGray,
                    alpha,
                    compress,
                    interpolate,
                )
            })
            .transpose()?;
        Ok((image, mask))
    }

    /// The JPEG file is embedded as is, only the header is read.
    pub fn from_jpeg(data: &[u8], interpolate: bool) -> Result<Self, Error> {
        let decoder = JpegDecoder::new(Cursor::new(data))?;
        let (width, height) = decoder.dimensions();
        let color_space = match (jpeg_component_count(data), decoder.color_type()) {
            (Some(4), _) => ColorSpace::DeviceCmyk,
            (_, JpegColorType::L8) => ColorSpace::DeviceGray,
            (_, JpegColorType::Rgb8) => ColorSpace::DeviceRgb,
            (_, other) => {
                return Err(Error::UnsupportedFormat(format!(
                    "JPEG color type `{:?}` can not be embedded.",
                    other
                )))
            }
        };
        Ok(Self {
            width,
            height,
            color_space,
            bits_per_component: 8,
            interpolate,
            image_data: data.to_vec(),
            filter: Some(ImageFilter::Dct),
            inverted: color_space == ColorSpace::DeviceCmyk && has_adobe_marker(data),
            s_mask: None,
        })
    }

    fn raw(
        width: u32,
        height: u32,
        color_space: ColorSpace,
        samples: Vec<u8>,
        compress: bool,
        interpolate: bool,
    ) -> Result<Self, Error> {
        let (image_data, filter) = if compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&samples)?;
            (encoder.finish()?, Some(ImageFilter::Flate))
        } else {
            (samples, None)
        };
        Ok(Self {
            width,
            height,
            color_space,
            bits_per_component: 8,
            interpolate,
            image_data,
            filter,
            inverted: false,
            s_mask: None, // This should be filled in later
        })
    }

    /// Split interleaved 8 bit samples into color and alpha samples.
    fn split_alpha_channel(data: &[u8], color_channels: usize) -> (Vec<u8>, Vec<u8>) {
        let pixel_size = color_channels + 1;
        let pixels = data.len() / pixel_size;
        let mut color = Vec::with_capacity(pixels * color_channels);
        let mut alpha = Vec::with_capacity(pixels);
        for pixel in data.chunks_exact(pixel_size) {
            color.extend_from_slice(&pixel[..color_channels]);
            alpha.push(pixel[color_channels]);
        }
        (color, alpha)
    }
}

/// Marker segments in front of the scan data, as `(marker, payload)`.
fn jpeg_segments(data: &[u8]) -> impl Iterator<Item = (u8, &[u8])> + '_ {
    let mut pos = 2;
    std::iter::from_fn(move || {
        // Markers may be preceded by any number of fill bytes.
        while data.get(pos) == Some(&0xFF) && data.get(pos + 1) == Some(&0xFF) {
            pos += 1;
        }
        if pos + 4 > data.len() || data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Entropy coded data follows SOS.
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        let length = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));
        let payload = data.get(pos + 4..pos + 2 + length.max(2))?;
        pos += 2 + length.max(2);
        Some((marker, payload))
    })
}

/// Number of color components declared in the first SOF segment.
fn jpeg_component_count(data: &[u8]) -> Option<u8> {
    // SOF0..SOF15, except DHT (C4), JPG (C8) and DAC (CC).
    let is_sof =
        |marker: u8| (0xC0..=0xCF).contains(&marker) && ![0xC4, 0xC8, 0xCC].contains(&marker);
    jpeg_segments(data)
        .find(|(marker, _)| is_sof(*marker))
        .and_then(|(_, payload)| payload.get(5).copied())
}

/// Adobe APP14 segment, written by encoders that store CMYK inverted.
fn has_adobe_marker(data: &[u8]) -> bool {
    jpeg_segments(data)
        .any(|(marker, payload)| marker == 0xEE && payload.starts_with(b"Adobe"))
}

// Inspired and derived from: https://github.com/fschutt/printpdf/blob/2bebdc65d06dafbe926ed4b43fedd10f966c59d3/src/xobject.rs#L245
impl From<ImageXObject> for lopdf::Stream {
    fn from(image: ImageXObject) -> Self {
        use lopdf::Object::*;

        let mut dict = lopdf::Dictionary::from_iter(vec![
            ("Type", Name("XObject".as_bytes().to_vec())),
            ("Subtype", Name("Image".as_bytes().to_vec())),
            ("Width", Integer(image.width as i64)),
            ("Height", Integer(image.height as i64)),
            ("Interpolate", image.interpolate.into()),
            ("BitsPerComponent", Integer(image.bits_per_component as i64)),
            (
                "ColorSpace",
                Name(image.color_space.pdf_name().as_bytes().to_vec()),
            ),
        ]);
        match image.filter {
            Some(ImageFilter::Flate) => dict.set("Filter", Name(b"FlateDecode".to_vec())),
            Some(ImageFilter::Dct) => dict.set("Filter", Name(b"DCTDecode".to_vec())),
            None => {}
        }
        if image.inverted {
            let decode = (0..image.color_space.components())
                .flat_map(|_| [Integer(1), Integer(0)])
                .collect();
            dict.set("Decode", Array(decode));
        }
        if let Some(s_mask) = image.s_mask {
            dict.set("SMask", Reference(s_mask));
        }

        // Data is already encoded (or is raw on purpose), lopdf must not compress it again.
        let mut stream = lopdf::Stream::new(dict, image.image_data);
        stream.allows_compression = false;
        stream
    }
}

impl From<ImageXObject> for lopdf::Object {
    fn from(image: ImageXObject) -> Self {
        lopdf::Object::Stream(image.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn encode_png(width: u32, height: u32, color: ColorType, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buf
    }

    #[test]
    fn rgba_png_gets_soft_mask() {
        let data: Vec<u8> = (0..4).flat_map(|i| [10, 20, 30, i as u8 * 60]).collect();
        let png = encode_png(2, 2, ColorType::Rgba, &data);
        let (image, mask) = ImageXObject::from_png(&png, false, false).unwrap();
        assert_eq!(image.color_space, ColorSpace::DeviceRgb);
        assert_eq!(image.image_data, [10u8, 20, 30].repeat(4));
        let mask = mask.unwrap();
        assert_eq!(mask.color_space, ColorSpace::DeviceGray);
        assert_eq!(mask.image_data, vec![0u8, 60, 120, 180]);
    }

    #[test]
    fn opaque_png_has_no_mask() {
        let data = [255u8, 0, 0, 255].repeat(4);
        let png = encode_png(2, 2, ColorType::Rgba, &data);
        let (_, mask) = ImageXObject::from_png(&png, true, false).unwrap();
        assert!(mask.is_none());
    }

    #[test]
    fn grayscale_alpha_splits_alpha_not_gray() {
        let data = vec![200u8, 10, 100, 20];
        let png = encode_png(2, 1, ColorType::GrayscaleAlpha, &data);
        let (image, mask) = ImageXObject::from_png(&png, false, false).unwrap();
        assert_eq!(image.image_data, vec![200, 100]);
        assert_eq!(mask.unwrap().image_data, vec![10, 20]);
    }

    #[test]
    fn compressed_png_is_flate_encoded() {
        let data = [0u8, 0, 0].repeat(16);
        let png = encode_png(4, 4, ColorType::Rgb, &data);
        let (image, _) = ImageXObject::from_png(&png, true, true).unwrap();
        assert_eq!(image.filter, Some(ImageFilter::Flate));
        let stream: lopdf::Stream = image.into();
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name_str().unwrap(),
            "FlateDecode"
        );
        // lopdf refuses to decompress image streams, inflate by hand.
        let mut inflated = Vec::new();
        flate2::read::ZlibDecoder::new(stream.content.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn garbage_is_not_a_png() {
        assert!(matches!(
            ImageXObject::from_png(b"not a png", true, false),
            Err(Error::PngError(_))
        ));
    }

    #[test]
    fn jpeg_is_embedded_unchanged() {
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
            .encode(&[128u8; 8 * 8 * 3], 8, 8, JpegColorType::Rgb8)
            .unwrap();
        let image = ImageXObject::from_jpeg(&jpeg, false).unwrap();
        assert_eq!((image.width, image.height), (8, 8));
        assert_eq!(image.color_space, ColorSpace::DeviceRgb);
        assert_eq!(jpeg_component_count(&jpeg), Some(3));
        assert_eq!(image.filter, Some(ImageFilter::Dct));
        assert_eq!(image.image_data, jpeg);
    }

    /// SOI, optional APP14, SOF0 with `components`, SOS followed by `scan`.
    fn jpeg_headers(adobe: bool, components: u8, scan: &[u8]) -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8];
        if adobe {
            jpeg.extend_from_slice(&[0xFF, 0xEE, 0x00, 0x0E]);
            jpeg.extend_from_slice(b"Adobe");
            jpeg.extend_from_slice(&[0, 100, 0, 0, 0, 0, 2]);
        }
        jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 8 + 3 * components as u8, 8, 0, 1, 0, 1]);
        jpeg.push(components);
        for id in 1..=components {
            jpeg.extend_from_slice(&[id, 0x11, 0]);
        }
        jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
        jpeg.extend_from_slice(scan);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn jpeg_markers_are_read_from_the_headers() {
        let cmyk = jpeg_headers(true, 4, &[]);
        assert_eq!(jpeg_component_count(&cmyk), Some(4));
        assert!(has_adobe_marker(&cmyk));

        let gray = jpeg_headers(false, 1, &[]);
        assert_eq!(jpeg_component_count(&gray), Some(1));
        assert!(!has_adobe_marker(&gray));
    }

    #[test]
    fn adobe_bytes_in_scan_data_are_ignored() {
        let jpeg = jpeg_headers(false, 4, b"..Adobe..");
        assert_eq!(jpeg_component_count(&jpeg), Some(4));
        assert!(!has_adobe_marker(&jpeg));
    }

    #[test]
    fn garbage_is_not_a_jpeg() {
        assert!(matches!(
            ImageXObject::from_jpeg(b"\x89PNG", false),
            Err(Error::ImageError(_))
        ));
    }
}
