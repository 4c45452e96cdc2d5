use base64::{engine::general_purpose::STANDARD, Engine as _};
use pdf_stamping::{SignaturePosition, SigningFacade, SigningOptions, Stamper};
use std::{fs::File, io::Write};

// Usage: stamp_doc <input.pdf> <output.pdf> [signature.png|signature.jpg] [name]
fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: stamp_doc <input.pdf> <output.pdf> [signature image] [typed name]");
        std::process::exit(2);
    }
    let pdf_data = std::fs::read(&args[1]).unwrap();

    let mut stamper = Stamper::load(pdf_data.clone(), SigningOptions::default()).unwrap();
    let last_page = stamper.document().page_count() as i64 - 1;

    if let Some(image_path) = args.get(3) {
        let mime_type = if image_path.to_ascii_lowercase().ends_with(".png") {
            "image/png"
        } else {
            "image/jpeg"
        };
        let image_data = std::fs::read(image_path).unwrap();
        let data_uri = format!("data:{};base64,{}", mime_type, STANDARD.encode(image_data));
        stamper
            .add_image(&data_uri, &SignaturePosition::new(72.0, 90.0, 160.0, 60.0, last_page))
            .unwrap();
    }
    let name = args.get(4).map(String::as_str).unwrap_or("Signed");
    stamper
        .add_text(name, &SignaturePosition::new(72.0, 72.0, 0.0, 0.0, last_page), Some(10.0))
        .unwrap();
    let pdf_file_data = stamper.finish().unwrap();

    let mut pdf_file = File::create(&args[2]).unwrap();
    pdf_file.write_all(&pdf_file_data).unwrap();

    // The same through the facade, which reports errors instead of returning them.
    let facade = SigningFacade::default();
    let position = SignaturePosition::new(72.0, 72.0, 0.0, 0.0, last_page + 1);
    if facade.process_text_signature(&pdf_data, name, &position).is_none() {
        println!("Expected failure: {}", facade.last_error().unwrap_or_default());
    }
}
