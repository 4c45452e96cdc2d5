#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pdf_stamping::lopdf::{
    content::{Content, Operation},
    dictionary, Dictionary, Document, Object, ObjectId, Stream,
};

/// Letter sized document with `pages` empty pages (no `Contents`, no `Resources`).
pub fn blank_pdf(pages: usize) -> Vec<u8> {
    build_pdf(pages, |_, _| None)
}

/// One page per entry showing the text with font `F1`.
/// Fonts and `MediaBox` are inherited from the `Pages` node.
pub fn text_pdf(page_texts: &[&str]) -> Vec<u8> {
    let texts: Vec<String> = page_texts.iter().map(|s| s.to_string()).collect();
    build_pdf(texts.len(), move |doc, index| {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(texts[index].as_str())]),
                Operation::new("ET", vec![]),
                // Leaves a scaled CTM behind on purpose.
                Operation::new(
                    "cm",
                    vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()],
                ),
            ],
        };
        let data = content.encode().unwrap();
        Some(doc.add_object(Stream::new(Dictionary::new(), data)))
    })
}

fn build_pdf<F>(pages: usize, mut page_content: F) -> Vec<u8>
where
    F: FnMut(&mut Document, usize) -> Option<ObjectId>,
{
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::new();
    for index in 0..pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        if let Some(content_id) = page_content(&mut doc, index) {
            page.set("Contents", content_id);
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap();
    output
}

/// A blank document whose trailer declares standard security.
pub fn encrypted_pdf() -> Vec<u8> {
    let mut doc = Document::load_mem(&blank_pdf(1)).unwrap();
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::string_literal(vec![0u8; 32]),
        "U" => Object::string_literal(vec![0u8; 32]),
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap();
    output
}

/// Half transparent red square.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let data = [255u8, 0, 0, 128].repeat((width * height) as usize);
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&data).unwrap();
    }
    buf
}

pub fn png_data_uri(width: u32, height: u32) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(width, height)))
}

pub fn jpeg_data_uri(width: u32, height: u32) -> String {
    let data = [40u8, 40, 200].repeat((width * height) as usize);
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .encode(&data, width, height, image::ColorType::Rgb8)
        .unwrap();
    format!("data:image/jpeg;base64,{}", STANDARD.encode(buf))
}

/// Operators of the decoded content of page `index` (zero based).
pub fn page_operations(pdf: &[u8], index: usize) -> Vec<Operation> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().values().nth(index).unwrap();
    doc.get_and_decode_page_content(page_id).unwrap().operations
}

/// Numeric operand; whole reals are written without a fraction and read back as integers.
pub fn number(object: &Object) -> f64 {
    match object {
        Object::Integer(value) => *value as f64,
        Object::Real(value) => *value as f64,
        other => panic!("not a number: {:?}", other),
    }
}

/// Image XObjects referenced from the resources of page `index`.
pub fn page_images(pdf: &[u8], index: usize) -> Vec<Stream> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().values().nth(index).unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    let Ok(resources) = page.get(b"Resources").and_then(Object::as_dict) else {
        return Vec::new();
    };
    let Ok(xobjects) = resources.get(b"XObject").and_then(Object::as_dict) else {
        return Vec::new();
    };
    xobjects
        .iter()
        .filter_map(|(_, obj)| obj.as_reference().ok())
        .filter_map(|id| doc.get_object(id).ok())
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name_str)
                .map(|name| name == "Image")
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
