use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One of the fixed physical paper layouts a blank can be printed on.
///
/// `Yellow`, `Pink` and `Blue` are the three permit stocks; `Voucher` is the
/// detachable hunting voucher printed over a pre-scanned background sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
pub enum BlankVariant {
    #[default]
    Yellow,
    Pink,
    Blue,
    Voucher,
}

impl BlankVariant {
    /// Parse a variant name coming from opaque config or client input.
    ///
    /// Never fails: anything unrecognized maps to `Yellow` so a caller with a
    /// stale or garbled config still gets a usable blank geometry.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pink" => BlankVariant::Pink,
            "blue" => BlankVariant::Blue,
            "voucher" => BlankVariant::Voucher,
            _ => BlankVariant::Yellow,
        }
    }
}

/// Hunter identity as kept by the external record store. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Hunter {
    #[schema(example = "Иванов Иван Иванович")]
    pub full_name: String,
    /// Hunting licence series.
    #[schema(example = "78")]
    pub series: String,
    /// Hunting licence number.
    #[schema(example = "014843")]
    pub number: String,
    /// Hunting licence issue date.
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
}

/// One hunted-species entry with its own season window and take limits.
///
/// Dates are kept as `YYYY-MM-DD` strings the way the form submits them; an
/// unparsable date simply means the corresponding stamp is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRow {
    #[serde(default)]
    #[schema(example = "Гусь")]
    pub resource: String,
    #[serde(default)]
    #[schema(example = "2025-09-15")]
    pub date_from: String,
    #[serde(default)]
    #[schema(example = "2026-02-28")]
    pub date_to: String,
    #[serde(default)]
    #[schema(example = "б/о")]
    pub daily_limit: String,
    #[serde(default)]
    #[schema(example = "б/о")]
    pub season_limit: String,
}

/// A named, reusable template of resource rows plus an associated blank
/// variant, managed by the external settings editor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SavedGroup {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Species names in stamping order; duplicates are meaningful.
    #[serde(default)]
    pub animals: Vec<String>,
    #[serde(default)]
    pub date_from: String,
    #[serde(default)]
    pub date_to: String,
    #[serde(default)]
    pub daily_limit: String,
    #[serde(default)]
    pub season_limit: String,
    /// Opaque variant name; resolved through `BlankVariant::parse`.
    #[serde(default)]
    pub blank_type: String,
}

/// Operator-entered print defaults, persisted in the config store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintConfig {
    pub organization_name: String,
    pub hunting_place: String,
    pub issued_by_name: String,
    pub hunt_type: String,
    pub job_title: String,
}

/// Everything the operator filled into the print form for one render.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FormValues {
    pub organization_name: String,
    pub hunting_place: String,
    pub issued_by_name: String,
    pub hunt_type: String,
    pub job_title: String,
    /// Permit issue date; today when absent.
    pub issue_date: Option<NaiveDate>,
    pub resources: Vec<ResourceRow>,
    /// Manual voucher number override. When empty the server allocates the
    /// next number from the persisted counter.
    pub voucher_number: Option<String>,
    /// Free-text special mark stamped on the voucher.
    pub voucher_note: Option<String>,
    pub voucher_permission_number: Option<String>,
}
