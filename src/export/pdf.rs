//! PDF assembly with `lopdf`
//!
//! The snapshot is written once as a form XObject and every page draws that
//! same object at its own vertical offset.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::paginate::Placement;
use super::render::{DrawOp, Snapshot};
use crate::error::Result;

const PT_PER_MM: f64 = 72.0 / 25.4;

const SNAPSHOT_NAME: &str = "Snap";
const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// Physical page size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    fn width_pt(&self) -> f64 {
        self.width_mm * PT_PER_MM
    }

    fn height_pt(&self) -> f64 {
        self.height_mm * PT_PER_MM
    }
}

fn real(value: f64) -> Object {
    Object::Real((value as f32).into())
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// Byte of `c` in WinAnsiEncoding, if the encoding has a glyph for it
fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        // C1 controls share these bytes with the glyphs above
        '\u{0080}'..='\u{009F}' => return None,
        _ => return u8::try_from(u32::from(c)).ok(),
    };
    Some(byte)
}

/// Encode text for a WinAnsi standard font; characters without a glyph become `?`
fn win_ansi(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|c| win_ansi_byte(c).unwrap_or(b'?'))
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

fn snapshot_content(snapshot: &Snapshot) -> Content {
    let h = f64::from(snapshot.height);
    let mut ops = vec![Operation::new("q", vec![])];

    for op in &snapshot.ops {
        match op {
            DrawOp::Text {
                x,
                baseline,
                size,
                bold,
                text,
            } => {
                let font = if *bold { FONT_BOLD } else { FONT_REGULAR };
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![name(font), real(f64::from(*size))]));
                ops.push(Operation::new(
                    "Td",
                    vec![real(f64::from(*x)), real(h - f64::from(*baseline))],
                ));
                ops.push(Operation::new("Tj", vec![win_ansi(text)]));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rule { y, x0, x1 } => {
                let y = h - f64::from(*y);
                ops.push(Operation::new("G", vec![real(0.8)]));
                ops.push(Operation::new("w", vec![real(1.0)]));
                ops.push(Operation::new("m", vec![real(f64::from(*x0)), real(y)]));
                ops.push(Operation::new("l", vec![real(f64::from(*x1)), real(y)]));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }

    ops.push(Operation::new("Q", vec![]));
    Content { operations: ops }
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => name(base),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Build a PDF with one page per placement, each drawing the full snapshot
/// scaled to the page width
pub fn write_pdf(snapshot: &Snapshot, page: PageSize, placements: &[Placement]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");

    let width = f64::from(snapshot.width).max(1.0);
    let height = f64::from(snapshot.height).max(1.0);
    let snapshot_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![real(0.0), real(0.0), real(width), real(height)],
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    FONT_REGULAR => regular,
                    FONT_BOLD => bold,
                },
            },
        },
        snapshot_content(snapshot).encode()?,
    ));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { SNAPSHOT_NAME => snapshot_id },
    });

    // Scale the snapshot to the page width; its height follows the aspect ratio
    let scale = page.width_pt() / width;
    let image_height_pt = height * scale;

    let mut kids = Vec::with_capacity(placements.len());
    for placement in placements {
        let offset_pt = placement.offset_y * PT_PER_MM;
        let ty = page.height_pt() - offset_pt - image_height_pt;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![real(scale), real(0.0), real(0.0), real(scale), real(0.0), real(ty)],
                ),
                Operation::new("Do", vec![name(SNAPSHOT_NAME)]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(count),
        "Resources" => resources_id,
        "MediaBox" => vec![real(0.0), real(0.0), real(page.width_pt()), real(page.height_pt())],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
