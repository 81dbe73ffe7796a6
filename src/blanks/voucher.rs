//! Generator for the hunting voucher.
//!
//! The voucher is stamped over a scanned background sheet supplied with the
//! request. The sheet holds two copies side by side, so every stamp is
//! drawn twice with a fixed horizontal offset and no rotation.

use chrono::NaiveDate;
use serde::Deserialize;

use super::common::{abbreviate_full_name, parse_form_date, sanitize_filename, short_date};
use super::coords::{coords_for, Point, ResourceCoords, VOUCHER_DUPLICATE_OFFSET_X};
use super::engine::{BlankFont, OverlayDocument};
use super::traits::{Generator, Validator};
use super::{BlankError, GeneratedBlank};
use crate::models::{BlankVariant, FormValues, Hunter, ResourceRow};

const FONT_SIZE: f32 = 8.0;

/// Request to render one voucher.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VoucherRequest {
    pub hunter: Hunter,
    pub form: FormValues,
    /// The already-allocated four-digit number to stamp.
    pub voucher_number: String,
    /// The scanned voucher sheet the stamps go over.
    #[serde(skip)]
    pub background: Vec<u8>,
}

impl Validator for VoucherRequest {
    fn validate(&self) -> Result<(), String> {
        if self.background.is_empty() {
            return Err("не передан фоновый лист путёвки".to_string());
        }
        Ok(())
    }
}

/// Earliest season start and latest season end across the resource rows.
pub fn season_span(rows: &[ResourceRow]) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let from = rows
        .iter()
        .filter_map(|row| parse_form_date(&row.date_from))
        .min();
    let to = rows
        .iter()
        .filter_map(|row| parse_form_date(&row.date_to))
        .max();
    (from, to)
}

/// Generator for the voucher sheet.
pub struct VoucherGenerator {
    font: BlankFont,
}

impl VoucherGenerator {
    /// Create a new generator instance, loading the bundled font.
    pub fn new() -> Result<Self, BlankError> {
        Ok(Self {
            font: BlankFont::load()?,
        })
    }

    pub fn with_font(font: BlankFont) -> Self {
        Self { font }
    }

    /// Stamp one value on both copies of the sheet. The value goes onto
    /// paper as-is, empty or not; coordinate presence alone decides
    /// whether a field is stamped.
    fn stamp(&self, doc: &mut OverlayDocument, text: &str, at: Point) {
        for x in [at.x, at.x + VOUCHER_DUPLICATE_OFFSET_X] {
            if let Err(err) = doc.draw_text(text, x, at.y, FONT_SIZE, 0.0) {
                log::warn!("пропущено поле «{text}»: {err}");
            }
        }
    }
}

impl Generator<VoucherRequest> for VoucherGenerator {
    fn generate(&self, request: VoucherRequest) -> Result<GeneratedBlank, BlankError> {
        if request.background.is_empty() {
            return Err(BlankError::EmptyBackground);
        }

        let hunter = &request.hunter;
        let form = &request.form;
        let coords = coords_for(BlankVariant::Voucher, form.resources.len());

        let mut doc = OverlayDocument::over(&request.background, &self.font)?;

        if let Some(at) = coords.full_name {
            self.stamp(&mut doc, &abbreviate_full_name(&hunter.full_name), at);
        }
        if let Some(at) = coords.ticket_series {
            self.stamp(&mut doc, &hunter.series, at);
        }
        if let Some(at) = coords.ticket_number {
            self.stamp(&mut doc, &hunter.number, at);
        }
        if let Some(at) = coords.issued_by {
            self.stamp(&mut doc, &form.issued_by_name, at);
        }
        if let Some(at) = coords.hunting_place {
            self.stamp(&mut doc, &form.hunting_place, at);
        }
        if let Some(at) = coords.job_title {
            self.stamp(&mut doc, &form.job_title, at);
        }
        if let Some(at) = coords.voucher_number {
            self.stamp(&mut doc, &request.voucher_number, at);
        }
        if let Some(at) = coords.permission_number {
            let number = form.voucher_permission_number.as_deref().unwrap_or("");
            self.stamp(&mut doc, number, at);
        }

        if let ResourceCoords::Range {
            min_date_from,
            max_date_to,
            special_mark,
        } = coords.resources
        {
            let (from, to) = season_span(&form.resources);
            if let Some(date) = from {
                self.stamp(&mut doc, &short_date(date), min_date_from);
            }
            if let Some(date) = to {
                self.stamp(&mut doc, &short_date(date), max_date_to);
            }
            if let Some(at) = special_mark {
                self.stamp(&mut doc, form.voucher_note.as_deref().unwrap_or(""), at);
            }
        }

        let pdf = doc.save()?;
        let filename = format!(
            "{}_путёвка.pdf",
            sanitize_filename(&hunter.full_name, "blank")
        );

        Ok(GeneratedBlank { filename, pdf })
    }
}
