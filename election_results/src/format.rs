//! Number and percent formatting used by report rows.

/// Formats an integer with thousands separators: `9999` -> `"9,999"`.
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut res = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        res.push('-');
    }
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            res.push(',');
        }
        res.push(c);
    }
    res
}

/// Percentage of `numerator` over `denominator`.
///
/// A zero denominator gives 0. Equal values give exactly 100.
pub fn compute_percent(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else if numerator == denominator {
        100.0
    } else {
        (numerator as f64) * 100.0 / (denominator as f64)
    }
}

pub fn format_percent(percent: f64) -> String {
    format!("{:.2}%", percent)
}
