//! PDF rendering with `lopdf`.
//!
//! A TrueType font found on the host is embedded as a Type0/Identity-H font
//! so Hangul renders. Without one the built-in Courier font is used and
//! characters outside Latin-1 come out as `?`.

use super::layout::{layout_text, normalize_text, LayoutLine};
use super::{ExportError, REPORT_TITLE};
use crate::config::ExportConfig;
use crate::models::TIMESTAMP_FORMAT;
use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use ttf_parser::{Face, GlyphId};

const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 10.0 * MM;
const BOTTOM_MARGIN: f32 = 20.0 * MM;
const FONT_SIZE: f32 = 11.0;
const HEADER_ROW: f32 = 10.0 * MM;
const LINE_HEIGHT: f32 = 8.0 * MM;
const BLANK_GAP: f32 = 5.0 * MM;
const COURIER_ADVANCE: f32 = 600.0;

pub const FALLBACK_FONT_WARNING: &str =
    "No Korean font found; using a basic font. Some characters may render incorrectly.";

/// Rendered PDF plus an optional font warning for the operator
#[derive(Debug, Clone)]
pub struct PdfExport {
    pub bytes: Vec<u8>,
    pub warning: Option<String>,
}

/// Render `text` as a PDF report
pub fn to_pdf_document(text: &str, config: &ExportConfig) -> Result<PdfExport, ExportError> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let font_file = find_font(&config.pdf_font_paths);
    render(text, font_file.as_ref().map(|(p, d)| (p.as_path(), d.as_slice())), &timestamp)
}

/// First candidate that exists and parses as a TrueType font
fn find_font(candidates: &[PathBuf]) -> Option<(PathBuf, Vec<u8>)> {
    candidates.iter().find_map(|path| {
        let data = std::fs::read(path).ok()?;
        match Face::parse(&data, 0) {
            Ok(_) => Some((path.clone(), data)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping unusable font");
                None
            }
        }
    })
}

/// Glyph metrics and encoding for the active font
enum PdfFont<'a> {
    Embedded {
        name: String,
        data: &'a [u8],
        face: Face<'a>,
    },
    Courier,
}

#[derive(Debug, Clone, Copy)]
struct GlyphUse {
    ch: char,
    advance: u16,
}

impl<'a> PdfFont<'a> {
    fn load(font_file: Option<(&Path, &'a [u8])>) -> Self {
        let Some((path, data)) = font_file else {
            return PdfFont::Courier;
        };
        match Face::parse(data, 0) {
            Ok(face) => PdfFont::Embedded {
                name: base_font_name(path),
                data,
                face,
            },
            Err(_) => PdfFont::Courier,
        }
    }

    fn is_embedded(&self) -> bool {
        matches!(self, PdfFont::Embedded { .. })
    }

    /// Advance of `c` in text-space points at [`FONT_SIZE`]
    fn width(&self, c: char) -> f32 {
        match self {
            PdfFont::Embedded { face, .. } => {
                let gid = face.glyph_index(c).unwrap_or(GlyphId(0));
                let advance = face.glyph_hor_advance(gid).unwrap_or(0) as f32;
                advance * FONT_SIZE / face.units_per_em() as f32
            }
            PdfFont::Courier => COURIER_ADVANCE * FONT_SIZE / 1000.0,
        }
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.width(c)).sum()
    }

    /// String operand for `Tj`, recording embedded glyphs in `used`
    fn encode(&self, text: &str, used: &mut BTreeMap<u16, GlyphUse>) -> Object {
        match self {
            PdfFont::Embedded { face, .. } => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
                    let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                    used.entry(gid.0).or_insert(GlyphUse { ch, advance });
                    bytes.extend_from_slice(&gid.0.to_be_bytes());
                }
                Object::String(bytes, StringFormat::Hexadecimal)
            }
            PdfFont::Courier => {
                let bytes = text
                    .chars()
                    .map(|c| match c as u32 {
                        code @ (0x20..=0x7e | 0xa0..=0xff) => code as u8,
                        _ => b'?',
                    })
                    .collect();
                Object::String(bytes, StringFormat::Literal)
            }
        }
    }
}

fn base_font_name(path: &Path) -> String {
    let stem: String = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if stem.is_empty() {
        "EmbeddedUnicode".to_string()
    } else {
        stem
    }
}

/// Collects page content streams while tracking the vertical cursor
struct PageWriter<'f, 'a> {
    font: &'f PdfFont<'a>,
    pages: Vec<Vec<Operation>>,
    /// Distance from the top edge of the current page
    cursor: f32,
    used: BTreeMap<u16, GlyphUse>,
}

impl<'f, 'a> PageWriter<'f, 'a> {
    fn new(font: &'f PdfFont<'a>) -> Self {
        Self {
            font,
            pages: vec![Vec::new()],
            cursor: MARGIN,
            used: BTreeMap::new(),
        }
    }

    fn break_if_needed(&mut self, height: f32) {
        if self.cursor + height > PAGE_HEIGHT - BOTTOM_MARGIN {
            self.pages.push(Vec::new());
            self.cursor = MARGIN;
        }
    }

    /// One row of `height`, text vertically centered like a table cell
    fn row(&mut self, text: &str, height: f32, x: f32) {
        self.break_if_needed(height);
        let baseline = PAGE_HEIGHT - (self.cursor + height / 2.0 + FONT_SIZE * 0.35);
        let operand = self.font.encode(text, &mut self.used);
        if let Some(page) = self.pages.last_mut() {
            page.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Real(FONT_SIZE)]),
                Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]),
                Operation::new("Tj", vec![operand]),
                Operation::new("ET", vec![]),
            ]);
        }
        self.cursor += height;
    }

    fn gap(&mut self, height: f32) {
        self.cursor += height;
    }
}

fn render(text: &str, font_file: Option<(&Path, &[u8])>, timestamp: &str) -> Result<PdfExport, ExportError> {
    let font = PdfFont::load(font_file);
    let warning = if font.is_embedded() {
        None
    } else {
        warn!("No Unicode font available for PDF export, falling back to Courier");
        Some(FALLBACK_FONT_WARNING.to_string())
    };

    let content_width = PAGE_WIDTH - 2.0 * MARGIN;
    let body = normalize_text(text);
    let (lines, skipped) = layout_text(&body, content_width, &|c| font.width(c));
    for message in &skipped {
        debug!(%message, "PDF line dropped");
    }

    let mut writer = PageWriter::new(&font);

    let title_x = (PAGE_WIDTH - font.text_width(REPORT_TITLE)) / 2.0;
    writer.row(REPORT_TITLE, HEADER_ROW, title_x.max(MARGIN));

    let stamp = format!("생성 일시: {}", timestamp);
    let stamp_x = PAGE_WIDTH - MARGIN - font.text_width(&stamp);
    writer.row(&stamp, HEADER_ROW, stamp_x.max(MARGIN));
    writer.gap(HEADER_ROW);

    for line in &lines {
        match line {
            LayoutLine::Blank => writer.gap(BLANK_GAP),
            LayoutLine::Text(row) => writer.row(row, LINE_HEIGHT, MARGIN),
        }
    }

    let PageWriter { pages, used, .. } = writer;
    let bytes = assemble(&font, pages, &used)?;

    info!(
        bytes = bytes.len(),
        lines = lines.len(),
        skipped = skipped.len(),
        embedded_font = font.is_embedded(),
        "PDF rendered"
    );
    Ok(PdfExport { bytes, warning })
}

fn assemble(
    font: &PdfFont<'_>,
    pages: Vec<Vec<Operation>>,
    used: &BTreeMap<u16, GlyphUse>,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = add_font(&mut doc, font, used);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
        }),
    );

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

fn add_font(doc: &mut Document, font: &PdfFont<'_>, used: &BTreeMap<u16, GlyphUse>) -> ObjectId {
    let (name, data, face) = match font {
        PdfFont::Courier => {
            return doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Courier",
                "Encoding" => "WinAnsiEncoding",
            });
        }
        PdfFont::Embedded { name, data, face } => (name, data, face),
    };

    let scale = 1000.0 / face.units_per_em() as f32;
    let scaled = |v: i16| Object::Integer((v as f32 * scale).round() as i64);
    let bbox = face.global_bounding_box();

    let mut file_dict = Dictionary::new();
    file_dict.set("Length1", data.len() as i64);
    let file_id = doc.add_object(Stream::new(file_dict, data.to_vec()));

    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(name.as_bytes().to_vec()),
        "Flags" => 4,
        "FontBBox" => vec![
            scaled(bbox.x_min),
            scaled(bbox.y_min),
            scaled(bbox.x_max),
            scaled(bbox.y_max),
        ],
        "ItalicAngle" => 0,
        "Ascent" => scaled(face.ascender()),
        "Descent" => scaled(face.descender()),
        "CapHeight" => scaled(face.capital_height().unwrap_or(face.ascender())),
        "StemV" => 80,
        "FontFile2" => file_id,
    });

    let mut widths: Vec<Object> = Vec::with_capacity(used.len() * 2);
    for (gid, glyph) in used {
        widths.push(Object::Integer(*gid as i64));
        widths.push(Object::Array(vec![Object::Integer(
            (glyph.advance as f32 * scale).round() as i64,
        )]));
    }

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::Name(name.as_bytes().to_vec()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(used).into_bytes()));

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(name.as_bytes().to_vec()),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    })
}

/// CMap mapping glyph ids back to Unicode so text stays searchable
fn to_unicode_cmap(used: &BTreeMap<u16, GlyphUse>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );

    let entries: Vec<(&u16, &GlyphUse)> = used.iter().collect();
    // bfchar blocks hold at most 100 entries
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, glyph) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = glyph
                .ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            let _ = writeln!(cmap, "<{:04X}> <{}>", gid, utf16);
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}
