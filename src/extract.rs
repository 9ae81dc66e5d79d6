// src/extract.rs
//! Best-effort numbers from free text. Job boards phrase salary and
//! experience in dozens of ways; these parsers cover the common Indian
//! formats and return `None` for everything else rather than guessing.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_LAKH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^\d,.])(\d+(?:\.\d+)?)\s*(?:(?:-|–|to)\s*\d+(?:\.\d+)?\s*)?(?:lpa|l\.p\.a|lakhs?|lacs?)",
    )
    .expect("lakh regex")
});

static RE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:₹|rs\.?|inr)?\s*(\d{1,3}(?:,\d{2,3})+|\d{5,})").expect("amount regex")
});

static RE_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^\d.])(\d{1,2})(?:\.\d+)?\s*(?:\+\s*)?(?:(?:-|–|to)\s*\d{1,2}(?:\.\d+)?\s*)?\+?\s*(?:years?|yrs?)\b",
    )
    .expect("years regex")
});

/// Lower bound of an annual salary in rupees.
///
/// `"4-6 LPA"` → 400000, `"3.5 Lacs PA"` → 350000, `"₹4,50,000"` → 450000.
pub fn parse_salary(text: &str) -> Option<u64> {
    let lakh = RE_LAKH.captures(text).and_then(|c| c.get(1));
    let amount = RE_AMOUNT.captures(text).and_then(|c| c.get(1));

    // "4,50,000 - 6 Lacs": the lower bound is whichever figure comes first
    match (lakh, amount) {
        (Some(l), Some(a)) if a.start() < l.start() => parse_amount(a.as_str()),
        (Some(l), _) => {
            let lakhs: f64 = l.as_str().parse().ok()?;
            Some((lakhs * 100_000.0).round() as u64)
        }
        (None, Some(a)) => parse_amount(a.as_str()),
        (None, None) => None,
    }
}

fn parse_amount(digits: &str) -> Option<u64> {
    digits.replace(',', "").parse().ok()
}

/// Minimum years of experience from the first range/number found.
/// Fractions are truncated.
///
/// `"0-2 Yrs"` → 0, `"3+ years"` → 3, `"2 to 5 years"` → 2, `"1.5 years"` → 1.
pub fn parse_experience_years(text: &str) -> Option<u32> {
    RE_YEARS
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
