#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Cursor;

use lopdf::{Document, Object};
use pdf_writer::{Content, Pdf, Rect, Ref};

pub const MM: f32 = 72.0 / 25.4;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A minimal PDF with `pages` blank pages of `width` x 400 pt. The MediaBox
/// sits on the page tree node, so pages only inherit it.
pub fn make_pdf(pages: usize, width: f32) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let page_ids: Vec<Ref> = (0..pages).map(|i| Ref::new(3 + 2 * i as i32)).collect();

    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(pages as i32)
        .media_box(Rect::new(0.0, 0.0, width, 400.0));

    for (i, &page_id) in page_ids.iter().enumerate() {
        let content_id = Ref::new(page_id.get() + 1);
        let mut content = Content::new();
        content.rect(10.0, 10.0, 20.0 + i as f32, 20.0);
        content.fill_nonzero();
        pdf.stream(content_id, content.finish().as_slice());
        pdf.page(page_id).parent(tree_id).contents(content_id);
    }
    pdf.finish()
}

fn encode(img: image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode image");
    buf.into_inner()
}

pub fn make_png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    encode(image::DynamicImage::ImageRgb8(img), image::ImageFormat::Png)
}

pub fn make_grayscale_png(w: u32, h: u32) -> Vec<u8> {
    let img = image::GrayImage::from_fn(w, h, |x, _| image::Luma([(x * 7 % 256) as u8]));
    encode(image::DynamicImage::ImageLuma8(img), image::ImageFormat::Png)
}

pub fn make_jpeg(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([200, 40, 40]));
    encode(image::DynamicImage::ImageRgb8(img), image::ImageFormat::Jpeg)
}

fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r as f32,
        other => panic!("expected a number, got {other:?}"),
    }
}

/// (width, height) of every page in document order, from each page's own MediaBox.
pub fn page_sizes(bytes: &[u8]) -> Vec<(f32, f32)> {
    let doc = Document::load_mem(bytes).expect("output parses");
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).expect("page dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(Object::as_array)
                .expect("page carries a MediaBox");
            let n: Vec<f32> = media_box.iter().map(number).collect();
            (n[2] - n[0], n[3] - n[1])
        })
        .collect()
}

pub fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).expect("output parses").get_pages().len()
}

pub fn is_a4(size: (f32, f32)) -> bool {
    (size.0 - 595.28).abs() < 0.5 && (size.1 - 841.89).abs() < 0.5
}

pub fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w == needle.as_bytes())
}

/// WinAnsi bytes for text made of Latin-1 characters and the en dash.
pub fn winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2013}' => 0x96,
            c if (c as u32) < 0x100 => c as u8,
            other => panic!("{other:?} is not in the test encoding"),
        })
        .collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Offset of a PDF string operand in raw (uncompressed) output, written either
/// as a literal `(...)` or as a hex `<...>` string.
pub fn find_pdf_string(haystack: &[u8], text: &[u8]) -> Option<usize> {
    let mut escaped = vec![b'('];
    for &b in text {
        if matches!(b, b'(' | b')' | b'\\') {
            escaped.push(b'\\');
        }
        escaped.push(b);
    }
    escaped.push(b')');

    let mut octal = vec![b'('];
    for &b in text {
        match b {
            b'(' | b')' | b'\\' => octal.extend([b'\\', b]),
            0x80.. => octal.extend(format!("\\{b:03o}").into_bytes()),
            _ => octal.push(b),
        }
    }
    octal.push(b')');

    let mut raw = vec![b'('];
    raw.extend_from_slice(text);
    raw.push(b')');

    let hex: String = text.iter().map(|b| format!("{b:02X}")).collect();
    let upper = format!("<{hex}>").into_bytes();
    let lower = format!("<{}>", hex.to_ascii_lowercase()).into_bytes();

    [escaped, octal, raw, upper, lower]
        .iter()
        .filter_map(|candidate| find(haystack, candidate))
        .min()
}

/// One `BT ... ET` text object: fill color in effect, x of its first `Td`,
/// and the strings it shows.
#[derive(Debug)]
pub struct TextObject {
    pub fill: Vec<f32>,
    pub x: Option<f32>,
    pub strings: Vec<Vec<u8>>,
}

impl TextObject {
    pub fn shows(&self, text: &str) -> bool {
        self.strings.iter().any(|s| s == text.as_bytes())
    }
}

/// Text objects of one page, in content-stream order.
pub fn text_objects(bytes: &[u8], page_index: usize) -> Vec<TextObject> {
    let doc = Document::load_mem(bytes).expect("output parses");
    let page_id = *doc
        .get_pages()
        .values()
        .nth(page_index)
        .expect("page exists");
    let data = doc.get_page_content(page_id).expect("page content");
    let content = lopdf::content::Content::decode(&data).expect("content decodes");

    let mut fill = Vec::new();
    let mut objects = Vec::new();
    let mut current: Option<TextObject> = None;
    for op in content.operations {
        match op.operator.as_str() {
            "rg" => fill = op.operands.iter().map(number).collect(),
            "BT" => {
                current = Some(TextObject {
                    fill: fill.clone(),
                    x: None,
                    strings: Vec::new(),
                })
            }
            "Td" => {
                if let Some(obj) = current.as_mut()
                    && obj.x.is_none()
                {
                    obj.x = Some(number(&op.operands[0]));
                }
            }
            "Tj" => {
                if let (Some(obj), Some(Object::String(s, _))) = (current.as_mut(), op.operands.first()) {
                    obj.strings.push(s.clone());
                }
            }
            "ET" => objects.extend(current.take()),
            _ => {}
        }
    }
    objects
}
