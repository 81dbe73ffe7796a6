//! Resource-group expansion.
//!
//! Turns a saved group name or a freeform species list into the bounded set
//! of resource rows the renderer stamps. The whole row set is replaced in
//! one step or not at all; recoverable conditions come back as
//! [`ExpandError`] values for the caller to act on.

use thiserror::Error;

use super::coords::MAX_RESOURCES;
use crate::models::{BlankVariant, ResourceRow, SavedGroup};

/// Season window applied to manually typed species lists.
pub const DEFAULT_SEASON_FROM: &str = "2025-09-15";
pub const DEFAULT_SEASON_TO: &str = "2026-02-28";

/// Literal take-limit token meaning "unlimited".
pub const UNLIMITED: &str = "б/о";

/// A complete replacement row set plus the blank variant to switch to.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupExpansion {
    pub rows: Vec<ResourceRow>,
    pub variant: BlankVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// Blank input; the caller keeps its current rows untouched.
    #[error("пустой ввод — текущий список ресурсов не изменён")]
    EmptyInput,

    /// The input produced no tokens at all.
    #[error("Ничего не распознано во вводе. Введите список животных через запятую или выберите сохранённую группу.")]
    NothingRecognized,

    /// Too many species for one blank; the caller must confirm truncation
    /// before resolution proceeds.
    #[error("Ввод содержит {total} животных, максимум {limit}. Подтвердите обрезку до {limit}.")]
    TruncationNeeded { total: usize, limit: usize },
}

/// Expand `input` against the saved groups.
///
/// An exact case-insensitive name match wins and adopts the group's blank
/// variant; otherwise the input is read as a comma/semicolon/newline
/// separated species list and the variant resets to `Yellow`, since a typed
/// list is not tied to any particular paper stock.
pub fn expand(
    input: &str,
    groups: &[SavedGroup],
    confirm_truncation: bool,
) -> Result<GroupExpansion, ExpandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ExpandError::EmptyInput);
    }

    let wanted = trimmed.to_lowercase();
    if let Some(group) = groups.iter().find(|g| g.name.to_lowercase() == wanted) {
        return Ok(GroupExpansion {
            rows: group_rows(group),
            variant: BlankVariant::parse(&group.blank_type),
        });
    }

    let animals: Vec<&str> = trimmed
        .split([',', ';', '\n'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    if animals.is_empty() {
        return Err(ExpandError::NothingRecognized);
    }
    if animals.len() > MAX_RESOURCES && !confirm_truncation {
        return Err(ExpandError::TruncationNeeded {
            total: animals.len(),
            limit: MAX_RESOURCES,
        });
    }

    let rows = animals
        .into_iter()
        .take(MAX_RESOURCES)
        .map(|animal| ResourceRow {
            resource: animal.to_string(),
            date_from: DEFAULT_SEASON_FROM.to_string(),
            date_to: DEFAULT_SEASON_TO.to_string(),
            daily_limit: UNLIMITED.to_string(),
            season_limit: UNLIMITED.to_string(),
        })
        .collect();

    Ok(GroupExpansion {
        rows,
        variant: BlankVariant::Yellow,
    })
}

fn group_rows(group: &SavedGroup) -> Vec<ResourceRow> {
    group
        .animals
        .iter()
        .take(MAX_RESOURCES)
        .map(|animal| ResourceRow {
            resource: animal.clone(),
            date_from: group.date_from.clone(),
            date_to: group.date_to.clone(),
            daily_limit: or_unlimited(&group.daily_limit),
            season_limit: or_unlimited(&group.season_limit),
        })
        .collect()
}

fn or_unlimited(limit: &str) -> String {
    if limit.trim().is_empty() {
        UNLIMITED.to_string()
    } else {
        limit.to_string()
    }
}
