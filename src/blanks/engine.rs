//! PDF stamping engine.
//!
//! Handles the low-level details of building page content streams, embedding
//! the Cyrillic-capable font, and overlaying stamps on a loaded background
//! template. The generators only ever call `add_page`/`draw_text`/`save`.

use std::collections::BTreeSet;
use std::fs;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use rusttype::{Font, Scale};
use thiserror::Error;

use super::common::get_static_dir;
use super::BlankError;

/// Font file shipped with the server; DejaVu Sans covers the Cyrillic range.
pub const FONT_FILE: &str = "DejaVuSans.ttf";

/// Resource name the engine registers its font under. Deliberately not `F1`
/// so stamping over a background never clobbers the template's own fonts.
const FONT_RESOURCE: &str = "Fhp";

/// A single failed stamp. Recovered by the generators: the field is skipped
/// and the render continues.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("font has no glyph for character {0:?}")]
    MissingGlyph(char),
}

/// The embedded TrueType font, parsed once and shared between generators.
#[derive(Clone)]
pub struct BlankFont {
    face: Font<'static>,
    data: Vec<u8>,
}

impl BlankFont {
    /// Load the bundled font from the static assets directory.
    pub fn load() -> Result<Self, BlankError> {
        let path = get_static_dir().join("fonts").join(FONT_FILE);
        let data = fs::read(&path).map_err(BlankError::FontIo)?;
        Self::from_bytes(data)
    }

    /// Parse raw TrueType bytes supplied by the caller.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, BlankError> {
        let face = Font::try_from_vec(data.clone()).ok_or(BlankError::FontParse)?;
        Ok(Self { face, data })
    }
}

/// Handle to one page of a [`BlankDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageId(usize);

struct PageBuf {
    width: f32,
    height: f32,
    ops: Vec<Operation>,
}

/// A fresh document built from blank pages (the permit stocks).
pub struct BlankDocument {
    doc: Document,
    pages_id: ObjectId,
    font: BlankFont,
    used: BTreeSet<char>,
    pages: Vec<PageBuf>,
}

impl BlankDocument {
    pub fn new(font: &BlankFont) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            pages_id,
            font: font.clone(),
            used: BTreeSet::new(),
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, width: f32, height: f32) -> PageId {
        self.pages.push(PageBuf {
            width,
            height,
            ops: Vec::new(),
        });
        PageId(self.pages.len() - 1)
    }

    /// Stamp `text` at `(x, y)` with the given rotation in degrees.
    ///
    /// An empty string is still a valid stamp; a character outside the
    /// font's coverage fails the whole stamp so no half-drawn value ends up
    /// on paper.
    pub fn draw_text(
        &mut self,
        page: PageId,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        rotation_degrees: f32,
    ) -> Result<(), DrawError> {
        let ops = text_ops(&self.font.face, text, x, y, size, rotation_degrees)?;
        self.used.extend(text.chars());
        self.pages[page.0].ops.extend(ops);
        Ok(())
    }

    /// Assemble and serialize the document.
    pub fn save(mut self) -> Result<Vec<u8>, BlankError> {
        let font_id = embed_font(&mut self.doc, &self.font, &self.used);

        let mut kids: Vec<Object> = Vec::new();
        for page in std::mem::take(&mut self.pages) {
            let encoded = Content { operations: page.ops }.encode()?;
            let contents_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![0f32.into(), 0f32.into(), page.width.into(), page.height.into()],
                "Resources" => dictionary! {
                    "Font" => dictionary! { FONT_RESOURCE => font_id },
                },
                "Contents" => contents_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Stamps laid over the first page of a loaded background template (the
/// voucher). The background is taken whole and never redrawn.
pub struct OverlayDocument {
    doc: Document,
    page_id: ObjectId,
    font: BlankFont,
    used: BTreeSet<char>,
    ops: Vec<Operation>,
}

impl OverlayDocument {
    pub fn over(background: &[u8], font: &BlankFont) -> Result<Self, BlankError> {
        let doc = Document::load_mem(background).map_err(BlankError::Background)?;
        let page_id = doc
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or(BlankError::EmptyBackground)?;

        Ok(Self {
            doc,
            page_id,
            font: font.clone(),
            used: BTreeSet::new(),
            // Isolate our graphics state from whatever the template left behind.
            ops: vec![Operation::new("q", vec![])],
        })
    }

    pub fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        rotation_degrees: f32,
    ) -> Result<(), DrawError> {
        let ops = text_ops(&self.font.face, text, x, y, size, rotation_degrees)?;
        self.used.extend(text.chars());
        self.ops.extend(ops);
        Ok(())
    }

    pub fn save(mut self) -> Result<Vec<u8>, BlankError> {
        self.ops.push(Operation::new("Q", vec![]));

        let font_id = embed_font(&mut self.doc, &self.font, &self.used);
        let encoded = Content {
            operations: std::mem::take(&mut self.ops),
        }
        .encode()?;
        let overlay_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));

        append_page_contents(&mut self.doc, self.page_id, overlay_id)?;
        add_page_font(&mut self.doc, self.page_id, font_id)?;

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Build the operation run for one stamp. Glyph IDs are written directly
/// (Identity-H encoding), so every character must resolve to a real glyph.
fn text_ops(
    face: &Font<'_>,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    rotation_degrees: f32,
) -> Result<Vec<Operation>, DrawError> {
    let mut glyph_bytes = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = face.glyph(ch).id().0;
        if gid == 0 {
            return Err(DrawError::MissingGlyph(ch));
        }
        glyph_bytes.extend_from_slice(&gid.to_be_bytes());
    }

    let (sin, cos) = rotation_degrees.to_radians().sin_cos();
    Ok(vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_RESOURCE.into(), size.into()]),
        Operation::new(
            "Tm",
            vec![
                cos.into(),
                sin.into(),
                (-sin).into(),
                cos.into(),
                x.into(),
                y.into(),
            ],
        ),
        Operation::new(
            "Tj",
            vec![Object::String(glyph_bytes, StringFormat::Hexadecimal)],
        ),
        Operation::new("ET", vec![]),
    ])
}

/// Embed the font as a Type0/CIDFontType2 with Identity-H encoding.
///
/// Widths are emitted only for the glyphs a document actually used, in
/// 1000-per-em units.
fn embed_font(doc: &mut Document, font: &BlankFont, used: &BTreeSet<char>) -> ObjectId {
    let scale = Scale::uniform(1000.0);

    let mut widths: Vec<Object> = Vec::new();
    for ch in used {
        let glyph = font.face.glyph(*ch);
        let gid = glyph.id().0;
        if gid == 0 {
            continue;
        }
        let advance = glyph.scaled(scale).h_metrics().advance_width;
        widths.push(Object::Integer(gid as i64));
        widths.push(Object::Array(vec![Object::Integer(advance.round() as i64)]));
    }

    let metrics = font.face.v_metrics(scale);
    let ascent = metrics.ascent.round() as i64;
    let descent = metrics.descent.round() as i64;

    let font_file_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => font.data.len() as i64 },
        font.data.clone(),
    ));

    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => "DejaVuSans",
        "Flags" => 32,
        "FontBBox" => vec![(-1021i64).into(), (-463i64).into(), 1793i64.into(), 1232i64.into()],
        "ItalicAngle" => 0,
        "Ascent" => ascent,
        "Descent" => descent,
        "CapHeight" => ascent,
        "StemV" => 80,
        "FontFile2" => font_file_id,
    });

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "DejaVuSans",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::String(b"Adobe".to_vec(), StringFormat::Literal),
            "Ordering" => Object::String(b"Identity".to_vec(), StringFormat::Literal),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "DejaVuSans",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
    })
}

fn append_page_contents(
    doc: &mut Document,
    page_id: ObjectId,
    overlay_id: ObjectId,
) -> Result<(), lopdf::Error> {
    let existing = doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();
    let merged = match existing {
        Some(Object::Array(mut items)) => {
            items.push(overlay_id.into());
            Object::Array(items)
        }
        Some(single @ Object::Reference(_)) => Object::Array(vec![single, overlay_id.into()]),
        _ => overlay_id.into(),
    };

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", merged);
    Ok(())
}

/// Register the embedded font in the page's resources, following one level
/// of indirection for /Resources and /Font if the template uses references.
fn add_page_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<(), lopdf::Error> {
    let resources_ref = {
        let page = doc.get_dictionary(page_id)?;
        match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(_) => None,
            Err(_) => {
                drop(page);
                let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
                page.set(
                    "Resources",
                    dictionary! { "Font" => dictionary! { FONT_RESOURCE => font_id } },
                );
                return Ok(());
            }
        }
    };

    let font_ref = {
        let resources: &Dictionary = match resources_ref {
            Some(id) => doc.get_dictionary(id)?,
            None => doc.get_dictionary(page_id)?.get(b"Resources")?.as_dict()?,
        };
        match resources.get(b"Font") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    };

    if let Some(fonts_id) = font_ref {
        let fonts = doc.get_object_mut(fonts_id)?.as_dict_mut()?;
        fonts.set(FONT_RESOURCE, font_id);
        return Ok(());
    }

    let resources: &mut Dictionary = match resources_ref {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .get_mut(b"Resources")?
            .as_dict_mut()?,
    };
    match resources.get_mut(b"Font") {
        Ok(Object::Dictionary(fonts)) => {
            fonts.set(FONT_RESOURCE, font_id);
        }
        _ => {
            resources.set("Font", dictionary! { FONT_RESOURCE => font_id });
        }
    }
    Ok(())
}
