use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Absolute percentage move that must be exceeded before news is fetched and sent.
pub const NOTIFY_THRESHOLD_PCT: Decimal = Decimal::TWO;

/// Direction of the day-over-day move.
///
/// A zero move counts as `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "🔼",
            Direction::Down => "🔽",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.arrow())
    }
}

/// Day-over-day change between two closing prices.
///
/// # Fields
/// * `prev_close`: close of the earlier trading day
/// * `curr_close`: close of the later trading day
/// * `diff`: `curr_close - prev_close`
/// * `pct`: `diff / prev_close * 100`, rounded to 2 decimals (0 when `prev_close` is 0)
/// * `direction`: `Up` only when `diff` is strictly positive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeResult {
    pub prev_close: Decimal,
    pub curr_close: Decimal,
    pub diff: Decimal,
    pub pct: Decimal,
    pub direction: Direction,
}

impl fmt::Display for ChangeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}%", self.direction, self.pct_text())
    }
}

impl ChangeResult {
    /// `pct` as it appears in alerts: whole numbers keep one decimal (`5.0`),
    /// except the zero-previous-close guard, which renders as `0`.
    pub fn pct_text(&self) -> String {
        if self.prev_close.is_zero() {
            return "0".to_string();
        }
        let pct = self.pct.normalize();
        if pct.scale() == 0 {
            format!("{}.0", pct)
        } else {
            pct.to_string()
        }
    }
}

/// Computes the change from `prev_close` to `curr_close`.
pub fn evaluate(prev_close: Decimal, curr_close: Decimal) -> ChangeResult {
    let diff = curr_close - prev_close;

    let pct = if prev_close.is_zero() {
        Decimal::ZERO
    } else {
        diff.checked_div(prev_close)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(if diff.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            })
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    };

    let direction = if diff > Decimal::ZERO {
        Direction::Up
    } else {
        Direction::Down
    };

    ChangeResult {
        prev_close,
        curr_close,
        diff,
        pct,
        direction,
    }
}

/// True when the move is large enough to alert on: `|pct| > 2`.
pub fn should_notify(pct: Decimal) -> bool {
    pct.abs() > NOTIFY_THRESHOLD_PCT
}
