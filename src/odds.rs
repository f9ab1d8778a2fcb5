//! American odds → implied win probability.
//!
//! Pure numeric helpers, no I/O. Probabilities are only ever displayed
//! for live events; that gate lives in the dashboard, not here.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Convert an American moneyline into the win probability it encodes.
///
/// Returns `None` for absent or non-finite input. Positive lines are
/// underdogs (`100 / (odds + 100)`); zero and negative lines are
/// favourites (`|odds| / (|odds| + 100)`).
pub fn implied_probability(odds: Option<f64>) -> Option<f64> {
    let odds = odds?;
    if !odds.is_finite() {
        return None;
    }

    let p = if odds > 0.0 {
        100.0 / (odds + 100.0)
    } else {
        odds.abs() / (odds.abs() + 100.0)
    };
    Some(p)
}

/// Format a probability (0.0–1.0) as a percentage with one decimal.
pub fn format_percentage(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// `implied_probability` followed by `format_percentage`.
pub fn implied_percentage(odds: Option<f64>) -> Option<String> {
    implied_probability(odds).map(format_percentage)
}

/// Coerce an upstream moneyline value into a number.
///
/// ESPN usually sends numbers but occasionally strings such as `"+130"`
/// or `"EVEN"`. Anything that does not parse to a finite number is absent.
pub fn coerce_american(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_prefix('+').unwrap_or(s);
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Serde adapter for optional moneyline fields.
pub(crate) fn deserialize_american<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_american))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
