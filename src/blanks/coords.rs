//! Coordinate registry for the physical blank layouts.
//!
//! Each variant carries its own literal table measured against the real
//! paper stock. The stocks differ by a few points each, so tables are never
//! derived from one another; the numbers below are the source of truth.

use crate::models::BlankVariant;

/// Longest resource list a blank can physically hold.
pub const MAX_RESOURCES: usize = 10;

/// Vertical distance between the two printed copies on a permit sheet.
pub const PERMIT_DUPLICATE_OFFSET_Y: f32 = 355.0;

/// Horizontal distance between the two printed copies on a voucher sheet.
pub const VOUCHER_DUPLICATE_OFFSET_X: f32 = 387.0;

/// A single text anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Up to three independent y-anchors sharing one x, used to print the day,
/// month and two-digit year of a date at different heights on the same
/// vertical line. Absent sub-anchors are not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DatePoint {
    pub x: f32,
    pub y_day: Option<f32>,
    pub y_month: Option<f32>,
    pub y_year: Option<f32>,
}

/// Anchors for one resource row on a row-list blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRowCoords {
    pub resource: Point,
    pub date_from: Point,
    pub date_to: Point,
    pub daily_limit: Point,
    pub season_limit: Point,
}

/// How a blank lays out its resources section.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceCoords {
    /// One coordinate bundle per row index (permit stocks).
    RowList(Vec<ResourceRowCoords>),
    /// A single earliest/latest date pair (voucher). The voucher never
    /// stamps individual rows.
    Range {
        min_date_from: Point,
        max_date_to: Point,
        special_mark: Option<Point>,
    },
}

/// Resolved anchors for every field a variant can stamp.
///
/// A field is stamped if and only if its anchor is present here; the three
/// identity anchors are mandatory for the permit stocks and checked before
/// any drawing starts.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCoordinateSet {
    pub full_name: Option<Point>,
    pub ticket_series: Option<Point>,
    pub ticket_number: Option<Point>,
    pub ticket_issue_date: Option<DatePoint>,
    pub issue_date: Option<DatePoint>,
    pub issued_by: Option<Point>,
    pub organization_name: Option<Point>,
    pub hunting_place: Option<Point>,
    pub back_issue_date: Option<DatePoint>,
    pub hunt_type: Option<Point>,
    pub job_title: Option<Point>,
    pub voucher_number: Option<Point>,
    pub permission_number: Option<Point>,
    pub resources: ResourceCoords,
}

/// Resolve the coordinate table for a variant.
///
/// Pure and total: the result depends only on the variant and the number of
/// resource rows the caller intends to stamp (capped at [`MAX_RESOURCES`]).
pub fn coords_for(variant: BlankVariant, resource_count: usize) -> FieldCoordinateSet {
    let rows = resource_count.min(MAX_RESOURCES);
    match variant {
        BlankVariant::Yellow => yellow(rows),
        BlankVariant::Pink => pink(rows),
        BlankVariant::Blue => blue(rows),
        BlankVariant::Voucher => voucher(),
    }
}

fn point(x: f32, y: f32) -> Option<Point> {
    Some(Point { x, y })
}

fn row_list(rows: usize, name_x: f32, value_x: f32, step: f32) -> ResourceCoords {
    ResourceCoords::RowList(
        (0..rows)
            .map(|i| {
                let shift = i as f32 * step;
                ResourceRowCoords {
                    resource: Point { x: name_x + shift, y: 40.0 },
                    date_from: Point { x: value_x + shift, y: 143.0 },
                    date_to: Point { x: value_x + shift, y: 190.0 },
                    daily_limit: Point { x: value_x + shift, y: 250.0 },
                    season_limit: Point { x: value_x + shift, y: 295.0 },
                }
            })
            .collect(),
    )
}

fn yellow(rows: usize) -> FieldCoordinateSet {
    FieldCoordinateSet {
        full_name: point(455.0, 95.0),
        ticket_series: point(498.0, 115.0),
        ticket_number: point(498.0, 165.0),
        ticket_issue_date: Some(DatePoint {
            x: 521.0,
            y_day: Some(120.0),
            y_month: Some(150.0),
            y_year: Some(255.0),
        }),
        issue_date: Some(DatePoint {
            x: 120.0,
            y_day: Some(660.0),
            y_month: Some(680.0),
            y_year: Some(700.0),
        }),
        issued_by: point(31.0, 245.0),
        organization_name: point(45.0, 20.0),
        hunting_place: point(346.0, 70.0),
        back_issue_date: Some(DatePoint {
            x: 60.0,
            y_day: Some(262.0),
            y_month: Some(285.0),
            y_year: Some(393.0),
        }),
        hunt_type: point(540.0, 55.0),
        job_title: None,
        voucher_number: None,
        permission_number: None,
        resources: row_list(rows, 171.0, 173.0, 17.0),
    }
}

fn pink(rows: usize) -> FieldCoordinateSet {
    FieldCoordinateSet {
        full_name: point(457.0, 95.0),
        ticket_series: point(501.0, 115.0),
        ticket_number: point(501.0, 165.0),
        ticket_issue_date: Some(DatePoint {
            x: 523.0,
            y_day: Some(120.0),
            y_month: Some(150.0),
            y_year: Some(255.0),
        }),
        issue_date: Some(DatePoint {
            x: 120.0,
            y_day: Some(660.0),
            y_month: Some(680.0),
            y_year: Some(700.0),
        }),
        issued_by: point(120.0, 245.0),
        organization_name: point(45.0, 20.0),
        hunting_place: point(348.0, 70.0),
        back_issue_date: Some(DatePoint {
            x: 146.0,
            y_day: Some(262.0),
            y_month: Some(285.0),
            y_year: Some(393.0),
        }),
        hunt_type: point(542.0, 55.0),
        job_title: None,
        voucher_number: None,
        permission_number: None,
        resources: row_list(rows, 187.0, 189.0, 16.0),
    }
}

fn blue(rows: usize) -> FieldCoordinateSet {
    FieldCoordinateSet {
        full_name: point(455.0, 95.0),
        ticket_series: point(498.0, 115.0),
        ticket_number: point(498.0, 165.0),
        ticket_issue_date: Some(DatePoint {
            x: 521.0,
            y_day: Some(120.0),
            y_month: Some(150.0),
            y_year: Some(255.0),
        }),
        issue_date: Some(DatePoint {
            x: 120.0,
            y_day: Some(660.0),
            y_month: Some(680.0),
            y_year: Some(700.0),
        }),
        issued_by: point(31.0, 245.0),
        organization_name: point(45.0, 20.0),
        hunting_place: point(346.0, 70.0),
        back_issue_date: Some(DatePoint {
            x: 60.0,
            y_day: Some(262.0),
            y_month: Some(285.0),
            y_year: Some(393.0),
        }),
        hunt_type: point(540.0, 55.0),
        job_title: None,
        voucher_number: None,
        permission_number: None,
        resources: row_list(rows, 171.0, 173.0, 17.0),
    }
}

fn voucher() -> FieldCoordinateSet {
    FieldCoordinateSet {
        full_name: point(57.0, 206.0),
        ticket_series: point(118.0, 186.0),
        ticket_number: point(160.0, 186.0),
        ticket_issue_date: None,
        issue_date: None,
        issued_by: point(57.0, 56.0),
        organization_name: None,
        hunting_place: point(57.0, 132.0),
        back_issue_date: None,
        hunt_type: None,
        job_title: point(57.0, 70.0),
        voucher_number: point(120.0, 272.0),
        permission_number: point(205.0, 272.0),
        resources: ResourceCoords::Range {
            min_date_from: Point { x: 95.0, y: 118.0 },
            max_date_to: Point { x: 230.0, y: 118.0 },
            special_mark: Some(Point { x: 57.0, y: 94.0 }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_for_is_deterministic() {
        for variant in [
            BlankVariant::Yellow,
            BlankVariant::Pink,
            BlankVariant::Blue,
            BlankVariant::Voucher,
        ] {
            assert_eq!(coords_for(variant, 3), coords_for(variant, 3));
        }
    }

    #[test]
    fn test_unrecognized_variant_name_gets_yellow_table() {
        let from_garbage = coords_for(BlankVariant::parse("no-such-stock"), 2);
        assert_eq!(from_garbage, coords_for(BlankVariant::Yellow, 2));
    }

    #[test]
    fn test_yellow_row_anchors_step_17() {
        let coords = coords_for(BlankVariant::Yellow, 3);
        match coords.resources {
            ResourceCoords::RowList(rows) => {
                assert_eq!(rows.len(), 3);
                assert_eq!(rows[0].resource, Point { x: 171.0, y: 40.0 });
                assert_eq!(rows[2].resource, Point { x: 205.0, y: 40.0 });
                assert_eq!(rows[1].date_from, Point { x: 190.0, y: 143.0 });
            }
            ResourceCoords::Range { .. } => panic!("yellow must use the row-list form"),
        }
    }

    #[test]
    fn test_pink_row_anchors_step_16() {
        let coords = coords_for(BlankVariant::Pink, 2);
        match coords.resources {
            ResourceCoords::RowList(rows) => {
                assert_eq!(rows[0].resource, Point { x: 187.0, y: 40.0 });
                assert_eq!(rows[1].resource, Point { x: 203.0, y: 40.0 });
                assert_eq!(rows[1].season_limit, Point { x: 205.0, y: 295.0 });
            }
            ResourceCoords::Range { .. } => panic!("pink must use the row-list form"),
        }
    }

    #[test]
    fn test_row_count_is_bounded() {
        let coords = coords_for(BlankVariant::Blue, 40);
        match coords.resources {
            ResourceCoords::RowList(rows) => assert_eq!(rows.len(), MAX_RESOURCES),
            ResourceCoords::Range { .. } => panic!("blue must use the row-list form"),
        }
    }

    #[test]
    fn test_voucher_uses_range_form() {
        let coords = coords_for(BlankVariant::Voucher, 7);
        match coords.resources {
            ResourceCoords::Range {
                min_date_from,
                max_date_to,
                special_mark,
            } => {
                assert!(min_date_from.x < max_date_to.x);
                assert!(special_mark.is_some());
            }
            ResourceCoords::RowList(_) => panic!("voucher must use the range form"),
        }
        assert!(coords.voucher_number.is_some());
    }

    #[test]
    fn test_permit_identity_anchors_present() {
        for variant in [BlankVariant::Yellow, BlankVariant::Pink, BlankVariant::Blue] {
            let coords = coords_for(variant, 1);
            assert!(coords.full_name.is_some());
            assert!(coords.ticket_series.is_some());
            assert!(coords.ticket_number.is_some());
        }
    }
}
