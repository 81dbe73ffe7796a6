//! Voucher number allocation.
//!
//! The counter itself lives in the config store; this module only computes
//! the pair of values for one render. The orchestrating handler writes
//! `next_value` back, and only after the render succeeded, so an aborted
//! render never advances the sequence.

/// The number to stamp on the in-progress voucher and the value to persist
/// for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherAllocation {
    pub use_number: String,
    pub next_value: String,
}

/// Allocate from the persisted counter value.
///
/// Unparsable or missing values count as `1`. Both outputs are zero-padded
/// to four digits.
pub fn allocate(current: &str) -> VoucherAllocation {
    let value = current.trim().parse::<u32>().unwrap_or(1);
    VoucherAllocation {
        use_number: format!("{value:04}"),
        next_value: format!("{:04}", value.saturating_add(1)),
    }
}
