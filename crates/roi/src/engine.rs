//! ROI estimation engine — pure mapping from team parameters to projected
//! savings. `compute` is total and side-effect free; input sanitation is
//! the caller's job and lives in the helpers below, not in the engine.

use serde::{Deserialize, Serialize};
use tracing::warn;

use metamech_core::{PlanCatalog, PlanId};

/// Average weeks per month used for the monthly projection. A stated
/// business simplification, not calendar-exact.
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// Fixed duration of the counter animation driven from engine output.
pub const TWEEN_DURATION_MS: u64 = 1_500;

/// Slider/input ranges from the calculator controls.
pub const ENGINEERS_RANGE: std::ops::RangeInclusive<u32> = 1..=50;
pub const HOURS_RANGE: std::ops::RangeInclusive<f64> = 1.0..=40.0;
pub const HOURLY_COST_RANGE: std::ops::RangeInclusive<f64> = 0.0..=200.0;
pub const WEEKS_RANGE: std::ops::RangeInclusive<u32> = 1..=52;

/// User-supplied business parameters. Recreated on every input change;
/// no identity of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiInputs {
    pub engineers: u32,
    pub hours_saved_per_week: f64,
    pub hourly_cost_eur: f64,
    pub working_weeks_per_year: u32,
    pub tool_cost_eur: f64,
}

impl Default for RoiInputs {
    /// The calculator's initial state: 5 engineers, 10 h/week, €75/h,
    /// 48 working weeks, Standard plan tool cost.
    fn default() -> Self {
        Self {
            engineers: 5,
            hours_saved_per_week: 10.0,
            hourly_cost_eur: 75.0,
            working_weeks_per_year: 48,
            tool_cost_eur: 999.0,
        }
    }
}

impl RoiInputs {
    /// Selecting a plan in the calculator replaces the tool cost with that
    /// plan's price.
    pub fn with_plan(mut self, catalog: &PlanCatalog, plan: PlanId) -> Self {
        if let Some(p) = catalog.get(plan) {
            self.tool_cost_eur = p.price_eur;
        }
        self
    }

    /// Clamp every field into its control range. Non-finite numbers
    /// collapse to the range start before clamping, so `compute` never
    /// sees NaN and never produces one. Tool cost has no slider; it only
    /// needs to be a non-negative finite number.
    pub fn sanitised(mut self) -> Self {
        self.engineers = self
            .engineers
            .clamp(*ENGINEERS_RANGE.start(), *ENGINEERS_RANGE.end());
        self.hours_saved_per_week = clamp_to_range(self.hours_saved_per_week, &HOURS_RANGE);
        self.hourly_cost_eur = clamp_to_range(self.hourly_cost_eur, &HOURLY_COST_RANGE);
        self.tool_cost_eur = clamp_non_negative(self.tool_cost_eur);
        self.working_weeks_per_year = self
            .working_weeks_per_year
            .clamp(*WEEKS_RANGE.start(), *WEEKS_RANGE.end());
        self
    }
}

/// Derived savings projection. Fully determined by `RoiInputs` (and the
/// selected plan's tool cost); equal inputs produce bit-identical results.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoiResult {
    pub weekly_savings: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub break_even_weeks: u32,
}

/// Compute the savings projection. Total: every combination of sanitised
/// inputs yields a well-defined result, break-even included (0 whenever
/// the tool is free or there are no savings to recoup it with).
pub fn compute(inputs: &RoiInputs) -> RoiResult {
    let weekly_savings =
        inputs.engineers as f64 * inputs.hours_saved_per_week * inputs.hourly_cost_eur;
    let monthly_savings = weekly_savings * WEEKS_PER_MONTH;
    let annual_savings = weekly_savings * inputs.working_weeks_per_year as f64;

    let break_even_weeks = if inputs.tool_cost_eur > 0.0 && weekly_savings > 0.0 {
        (inputs.tool_cost_eur / weekly_savings).ceil() as u32
    } else {
        0
    };

    RoiResult {
        weekly_savings,
        monthly_savings,
        annual_savings,
        break_even_weeks,
    }
}

impl RoiResult {
    /// Break-even position on a one-year scale, for the progress bar.
    pub fn break_even_ratio(&self) -> f64 {
        (self.break_even_weeks as f64 / 52.0).min(1.0)
    }
}

/// Parse a free-text numeric field. A cleared (empty) field is zero, and
/// anything unparseable or negative also collapses to zero rather than
/// propagating an invalid value into the engine.
pub fn parse_numeric_field(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => clamp_non_negative(v),
        Err(_) => {
            warn!(raw, "unparseable numeric field treated as zero");
            0.0
        }
    }
}

fn clamp_to_range(v: f64, range: &std::ops::RangeInclusive<f64>) -> f64 {
    if v.is_finite() {
        v.clamp(*range.start(), *range.end())
    } else {
        *range.start()
    }
}

fn clamp_non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Format a whole-euro amount the way the counters render it: rounded,
/// thousands-separated, `€` prefixed.
pub fn format_eur(value: f64) -> String {
    let rounded = value.round().max(0.0) as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("€{grouped}")
}
