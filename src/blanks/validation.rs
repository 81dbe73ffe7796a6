//! Precondition checks for blank rendering.
//!
//! Provides clear, descriptive messages that name the exact precondition
//! that failed, so a broken coordinate table is reported as a template
//! defect rather than a vague runtime error.

use std::fmt;

use super::coords::FieldCoordinateSet;
use crate::models::BlankVariant;

/// Validation error with detailed, user-friendly messages.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message in Russian
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for a coordinate table missing a mandatory anchor.
    pub fn missing_coordinate(field: &str, label: &str, variant: BlankVariant) -> Self {
        Self::new(
            field,
            format!("в таблице бланка {variant:?} нет координаты поля «{label}»"),
        )
        .with_suggestion("Таблица координат бланка повреждена; проверьте её описание")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get a formatted message naming every failed precondition.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Проверка не пройдена: найдено ошибок — {}",
            self.errors.len()
        )];

        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }

        parts.join("\n")
    }

    /// Convert to Result - Ok if no errors, Err with formatted message if errors exist
    pub fn into_result(self) -> Result<(), String> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.to_message())
        }
    }
}

/// Check the identity anchors a permit table must carry.
///
/// The voucher has no such requirement; for the permit stocks a missing
/// full-name, series or number anchor aborts the render before any drawing
/// starts.
pub fn ensure_identity_coords(
    variant: BlankVariant,
    coords: &FieldCoordinateSet,
) -> Result<(), String> {
    if variant == BlankVariant::Voucher {
        return Ok(());
    }

    let mut errors = ValidationErrors::new();
    if coords.full_name.is_none() {
        errors.add(ValidationError::missing_coordinate(
            "coords.full_name",
            "ФИО",
            variant,
        ));
    }
    if coords.ticket_series.is_none() {
        errors.add(ValidationError::missing_coordinate(
            "coords.ticket_series",
            "серия билета",
            variant,
        ));
    }
    if coords.ticket_number.is_none() {
        errors.add(ValidationError::missing_coordinate(
            "coords.ticket_number",
            "номер билета",
            variant,
        ));
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blanks::coords::coords_for;

    #[test]
    fn test_builtin_tables_pass() {
        for variant in [
            BlankVariant::Yellow,
            BlankVariant::Pink,
            BlankVariant::Blue,
            BlankVariant::Voucher,
        ] {
            assert!(ensure_identity_coords(variant, &coords_for(variant, 1)).is_ok());
        }
    }

    #[test]
    fn test_missing_identity_anchor_is_reported() {
        let mut coords = coords_for(BlankVariant::Yellow, 1);
        coords.full_name = None;
        coords.ticket_number = None;

        let message = ensure_identity_coords(BlankVariant::Yellow, &coords).unwrap_err();
        assert!(message.contains("coords.full_name"));
        assert!(message.contains("coords.ticket_number"));
        assert!(message.contains("ФИО"));
    }

    #[test]
    fn test_voucher_table_is_exempt() {
        let mut coords = coords_for(BlankVariant::Voucher, 1);
        coords.full_name = None;
        assert!(ensure_identity_coords(BlankVariant::Voucher, &coords).is_ok());
    }
}
