/// Maximum profit component.
pub const PROFIT_WEIGHT: f64 = 60.0;

/// Maximum waste component (nothing left over).
pub const WASTE_WEIGHT: f64 = 20.0;

/// Maximum business rule component (every rule passed).
pub const CONSTRAINT_WEIGHT: f64 = 20.0;

/// Upper bound of the overall score.
pub const MAX_TOTAL: f64 = 100.0;

// ─────────────────────────────────────────────────────────────────────────────
// Numeric tolerances
// ─────────────────────────────────────────────────────────────────────────────

/// Slack when flooring quantities to whole units, so 0.3 / 0.1 counts as 3.
pub const UNIT_TOLERANCE: f64 = 1e-9;

/// Slack on budget and capacity limits, so buying 3 x 0.1 fits a budget of 0.3.
pub const LIMIT_TOLERANCE: f64 = 1e-9;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.7;

// ─────────────────────────────────────────────────────────────────────────────
// Reporting
// ─────────────────────────────────────────────────────────────────────────────

/// Decimal places kept in written reports and leaderboard rows.
pub const REPORT_DECIMALS: u32 = 2;

/// Clamp a value into [0, max].
#[inline]
pub fn clamp_score(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}
