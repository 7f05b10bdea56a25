//! [`CurrencyAggregator`] – spoken summary of detected bills and coins.
//!
//! Denominations are listed in the order they were first detected, not by
//! value:
//!
//! ```text
//! [20_peso, 20_peso, 100_peso]  →  "2× ₱20 bill, ₱100 bill – total ₱140"
//! ```

use std::sync::Arc;

use eyes_types::{ClassificationTables, Denomination, Detection};

#[derive(Debug, Clone)]
pub struct CurrencyAggregator {
    tables: Arc<ClassificationTables>,
}

impl CurrencyAggregator {
    pub fn new(tables: Arc<ClassificationTables>) -> Self {
        Self { tables }
    }

    /// Summary string, or `None` when no detection is a currency class.
    pub fn summarize(&self, detections: &[Detection]) -> Option<String> {
        // (label, denomination, count) in first-seen order
        let mut counts: Vec<(&str, &Denomination, usize)> = Vec::new();
        let mut total = 0.0_f64;

        for det in detections {
            let Some(denom) = self.tables.denomination(&det.label) else {
                continue;
            };
            total += denom.value;
            match counts.iter_mut().find(|(label, _, _)| *label == det.label) {
                Some((_, _, n)) => *n += 1,
                None => counts.push((det.label.as_str(), denom, 1)),
            }
        }

        if counts.is_empty() {
            return None;
        }

        let phrases: Vec<String> = counts
            .iter()
            .map(|(_, denom, n)| {
                if *n > 1 {
                    format!("{n}× {}", denom.name)
                } else {
                    denom.name.clone()
                }
            })
            .collect();

        Some(format!(
            "{} – total {}{}",
            phrases.join(", "),
            self.tables.currency_symbol,
            format_thousands(total.round() as i64)
        ))
    }
}

/// `1234567` → `"1,234,567"`.
fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
