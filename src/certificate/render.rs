//! PDF serialization of laid-out pages.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::layout::{Mark, Page, PAGE_HEIGHT, PAGE_WIDTH};
use super::RenderError;

const FONT_NAME: &[u8] = b"F1";
const IMAGE_NAME: &[u8] = b"Im1";
/// Helvetica ascender, as a fraction of the font size.
const ASCENT: f32 = 0.718;

/// Raw 8-bit RGB raster to embed as an image XObject.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Document-level metadata written to the Info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub subject: &'a str,
}

/// Map text to WinAnsi bytes. Characters outside Latin-1 become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

pub fn render_pdf(
    pages: &[Page],
    image: Option<&EmbeddedImage>,
    info: &DocumentInfo<'_>,
) -> Result<Vec<u8>, RenderError> {
    if pages.is_empty() {
        return Err(RenderError::EmptyDocument);
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut xobjects = lopdf::Dictionary::new();
    if let Some(image) = image {
        let expected = image.width as usize * image.height as usize * 3;
        if image.rgb.len() != expected {
            return Err(RenderError::ImageSize {
                expected,
                actual: image.rgb.len(),
            });
        }
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            image.rgb.clone(),
        );
        stream.compress()?;
        let image_id = doc.add_object(stream);
        xobjects.set(IMAGE_NAME.to_vec(), Object::Reference(image_id));
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => xobjects,
    });

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, image.is_some()),
        };
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => page_ids.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(to_win_ansi(info.title)),
        "Subject" => Object::string_literal(to_win_ansi(info.subject)),
        "Producer" => Object::string_literal(concat!("railtrack-server ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
    });
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Write(e.to_string()))?;
    Ok(buffer)
}

fn page_operations(page: &Page, has_image: bool) -> Vec<Operation> {
    let mut ops = Vec::new();
    for mark in &page.marks {
        match mark {
            Mark::Text { x, y, size, text } => {
                let baseline = PAGE_HEIGHT - y - size * ASCENT;
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(FONT_NAME.to_vec()), Object::Real(*size)],
                ));
                ops.push(Operation::new("Td", vec![Object::Real(*x), Object::Real(baseline)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            Mark::Rule { x1, x2, y, width } => {
                let pdf_y = PAGE_HEIGHT - y;
                ops.push(Operation::new("w", vec![Object::Real(*width)]));
                ops.push(Operation::new("m", vec![Object::Real(*x1), Object::Real(pdf_y)]));
                ops.push(Operation::new("l", vec![Object::Real(*x2), Object::Real(pdf_y)]));
                ops.push(Operation::new("S", vec![]));
            }
            Mark::Image(rect) if has_image => {
                let bottom = PAGE_HEIGHT - rect.y - rect.height;
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        Object::Real(rect.width),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(rect.height),
                        Object::Real(rect.x),
                        Object::Real(bottom),
                    ],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]));
                ops.push(Operation::new("Q", vec![]));
            }
            Mark::Image(_) => {}
        }
    }
    ops
}
