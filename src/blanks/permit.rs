//! Generator for the two-page hunting permit.
//!
//! A permit sheet carries two identical copies of every stamp, shifted by a
//! fixed vertical offset and rotated 90 degrees to match the pre-printed
//! stock. The front page holds the hunter identity and the resource table,
//! the back page the issuer line and the issue date.

use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;

use super::common::{
    month_text, pad2, parse_form_date, sanitize_filename, short_date, two_digit_year, MonthStyle,
};
use super::coords::{
    coords_for, DatePoint, Point, ResourceCoords, MAX_RESOURCES, PERMIT_DUPLICATE_OFFSET_Y,
};
use super::engine::{BlankDocument, BlankFont, PageId};
use super::traits::{Generator, Validator};
use super::validation::ensure_identity_coords;
use super::{BlankError, GeneratedBlank};
use crate::models::{BlankVariant, FormValues, Hunter};

/// A4 portrait in PDF points.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;

const FONT_SIZE: f32 = 8.0;
const STAMP_ROTATION: f32 = 90.0;

/// Request to render one permit.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PermitRequest {
    pub hunter: Hunter,
    pub form: FormValues,
    pub variant: BlankVariant,
}

impl Validator for PermitRequest {
    fn validate(&self) -> Result<(), String> {
        let rows = self.form.resources.len().min(MAX_RESOURCES);
        ensure_identity_coords(self.variant, &coords_for(self.variant, rows))
    }
}

/// Generator for the permit stocks.
pub struct PermitGenerator {
    font: BlankFont,
}

impl PermitGenerator {
    /// Create a new generator instance, loading the bundled font.
    pub fn new() -> Result<Self, BlankError> {
        Ok(Self {
            font: BlankFont::load()?,
        })
    }

    pub fn with_font(font: BlankFont) -> Self {
        Self { font }
    }

    /// Stamp one value twice, at the anchor and at its duplicate position.
    ///
    /// The value goes onto paper as-is, empty or not; whether a field is
    /// stamped at all is decided by coordinate presence alone. A value the
    /// font cannot render is logged and skipped; the rest of the blank
    /// still prints.
    fn stamp(&self, doc: &mut BlankDocument, page: PageId, text: &str, at: Point) {
        for y in [at.y, at.y + PERMIT_DUPLICATE_OFFSET_Y] {
            if let Err(err) = doc.draw_text(page, text, at.x, y, FONT_SIZE, STAMP_ROTATION) {
                log::warn!("пропущено поле «{text}»: {err}");
            }
        }
    }

    /// Stamp a date decomposed into day, month and year sub-anchors.
    fn stamp_split_date(
        &self,
        doc: &mut BlankDocument,
        page: PageId,
        date: NaiveDate,
        at: DatePoint,
        style: MonthStyle,
    ) {
        if let Some(y) = at.y_day {
            self.stamp(doc, page, &pad2(date.day()), Point { x: at.x, y });
        }
        if let Some(y) = at.y_month {
            self.stamp(doc, page, &month_text(date, style), Point { x: at.x, y });
        }
        if let Some(y) = at.y_year {
            self.stamp(doc, page, &two_digit_year(date), Point { x: at.x, y });
        }
    }
}

impl Generator<PermitRequest> for PermitGenerator {
    fn generate(&self, request: PermitRequest) -> Result<GeneratedBlank, BlankError> {
        let hunter = &request.hunter;
        let form = &request.form;
        let rows = &form.resources[..form.resources.len().min(MAX_RESOURCES)];
        let coords = coords_for(request.variant, rows.len());

        ensure_identity_coords(request.variant, &coords).map_err(BlankError::ConfigDefect)?;

        let mut doc = BlankDocument::new(&self.font);
        let front = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT);
        let back = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT);

        if let Some(at) = coords.full_name {
            self.stamp(&mut doc, front, &hunter.full_name, at);
        }
        if let Some(at) = coords.ticket_series {
            self.stamp(&mut doc, front, &hunter.series, at);
        }
        if let Some(at) = coords.ticket_number {
            self.stamp(&mut doc, front, &hunter.number, at);
        }
        if let (Some(at), Some(date)) = (coords.ticket_issue_date, hunter.issue_date) {
            self.stamp_split_date(&mut doc, front, date, at, MonthStyle::GenitiveName);
        }

        let issue_date = form.issue_date.unwrap_or_else(|| Local::now().date_naive());
        if let Some(at) = coords.issue_date {
            self.stamp_split_date(&mut doc, front, issue_date, at, MonthStyle::GenitiveName);
        }

        if let Some(at) = coords.organization_name {
            self.stamp(&mut doc, front, &form.organization_name, at);
        }
        if let Some(at) = coords.hunting_place {
            self.stamp(&mut doc, front, &form.hunting_place, at);
        }
        if let Some(at) = coords.hunt_type {
            self.stamp(&mut doc, front, &form.hunt_type, at);
        }

        match &coords.resources {
            ResourceCoords::RowList(anchors) => {
                for (row, anchor) in rows.iter().zip(anchors) {
                    self.stamp(&mut doc, front, &row.resource, anchor.resource);
                    if let Some(date) = parse_form_date(&row.date_from) {
                        self.stamp(&mut doc, front, &short_date(date), anchor.date_from);
                    }
                    if let Some(date) = parse_form_date(&row.date_to) {
                        self.stamp(&mut doc, front, &short_date(date), anchor.date_to);
                    }
                    self.stamp(&mut doc, front, &row.daily_limit, anchor.daily_limit);
                    self.stamp(&mut doc, front, &row.season_limit, anchor.season_limit);
                }
            }
            ResourceCoords::Range { .. } => {
                log::warn!(
                    "таблица бланка {:?} не содержит построчных координат ресурсов",
                    request.variant
                );
            }
        }

        if let Some(at) = coords.issued_by {
            self.stamp(&mut doc, back, &form.issued_by_name, at);
        }
        if let Some(at) = coords.back_issue_date {
            self.stamp_split_date(&mut doc, back, issue_date, at, MonthStyle::TwoDigit);
        }

        let pdf = doc.save()?;
        let filename = format!(
            "{}_разрешение.pdf",
            sanitize_filename(&hunter.full_name, "blank")
        );

        Ok(GeneratedBlank { filename, pdf })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceRow;

    fn request(variant: BlankVariant, rows: usize) -> PermitRequest {
        PermitRequest {
            hunter: Hunter {
                full_name: "Иванов Иван Иванович".to_string(),
                series: "78".to_string(),
                number: "014843".to_string(),
                issue_date: NaiveDate::from_ymd_opt(2022, 10, 3),
            },
            form: FormValues {
                organization_name: "ООО «Охотхозяйство»".to_string(),
                hunting_place: "Лесной массив №3".to_string(),
                issued_by_name: "Петров П.П.".to_string(),
                hunt_type: "любительская".to_string(),
                issue_date: NaiveDate::from_ymd_opt(2025, 9, 1),
                resources: (0..rows)
                    .map(|i| ResourceRow {
                        resource: format!("Вид {}", i + 1),
                        date_from: "2025-09-15".to_string(),
                        date_to: "2026-02-28".to_string(),
                        daily_limit: "2".to_string(),
                        season_limit: "б/о".to_string(),
                    })
                    .collect(),
                ..FormValues::default()
            },
            variant,
        }
    }

    #[test]
    fn test_new_generator() {
        assert!(PermitGenerator::new().is_ok());
    }

    #[test]
    fn test_generate_two_page_pdf() {
        let generator = PermitGenerator::new().unwrap();
        let blank = generator.generate(request(BlankVariant::Yellow, 3)).unwrap();

        assert!(blank.pdf.starts_with(b"%PDF"));
        assert_eq!(blank.filename, "Иванов_Иван_Иванович_разрешение.pdf");

        let doc = lopdf::Document::load_mem(&blank.pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_generate_all_permit_variants() {
        let generator = PermitGenerator::new().unwrap();
        for variant in [BlankVariant::Yellow, BlankVariant::Pink, BlankVariant::Blue] {
            assert!(generator.generate(request(variant, 2)).is_ok());
        }
    }

    #[test]
    fn test_resource_rows_are_capped() {
        let generator = PermitGenerator::new().unwrap();
        assert!(generator.generate(request(BlankVariant::Pink, 25)).is_ok());
    }

    #[test]
    fn test_validate_builtin_variants() {
        for variant in [BlankVariant::Yellow, BlankVariant::Pink, BlankVariant::Blue] {
            assert!(request(variant, 1).validate().is_ok());
        }
    }
}
