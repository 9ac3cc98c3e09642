//! System prompt construction
//!
//! Turns a spending summary into the instruction message that opens every
//! conversation. Two fixed templates exist: one that embeds the client's
//! name and per-category totals, and a fallback with generic savings advice
//! for clients without recent transactions.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::spending::format_amount;

/// Template used when the client has recent transactions.
///
/// Variables: `{{client_name}}`, `{{lookback}}`, `{{spending_summary}}`
const SPENDING_TEMPLATE: &str = "\
You are a personal banking assistant powered by artificial intelligence.
Your task is to help the client {{client_name}} keep their lifestyle while improving their financial discipline.

Based on transactions from the last {{lookback}}, the client's spending habits are as follows:
{{spending_summary}}

Give concrete and realistic recommendations.
Be encouraging and empathetic, never judgmental.
Avoid drastic cuts unless they are absolutely necessary.
Your advice should be practical, easy to act on, and help the client save money without significantly lowering their quality of life.";

/// Template used when no transactions fall inside the lookback window
const FALLBACK_TEMPLATE: &str = "\
You are a personal banking assistant powered by artificial intelligence.
There is currently no financial data available about the client.
Give general advice on how to save money while keeping their current lifestyle.
Be friendly, practical and motivating.";

/// Fallback prompt for clients with no recent transactions (no figures, no name)
pub fn fallback_system_prompt() -> &'static str {
    FALLBACK_TEMPLATE
}

/// One `- <category>: $<amount>` line per category, sorted by category name
pub fn format_category_lines(by_category: &HashMap<String, Decimal>) -> String {
    let mut entries: Vec<(&String, &Decimal)> = by_category.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    entries
        .into_iter()
        .map(|(category, amount)| format!("- {}: ${}", category, format_amount(*amount)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// "month" for one, "N months" otherwise
fn lookback_phrase(months: u32) -> String {
    if months == 1 {
        "month".to_string()
    } else {
        format!("{} months", months)
    }
}

/// Build the system prompt for a client whose totals cover the last `months` months
///
/// An empty category map selects the fallback template.
pub fn build_system_prompt(
    client_name: &str,
    months: u32,
    by_category: &HashMap<String, Decimal>,
) -> String {
    if by_category.is_empty() {
        return fallback_system_prompt().to_string();
    }

    let summary = format_category_lines(by_category);
    let lookback = lookback_phrase(months);
    let mut vars = HashMap::new();
    vars.insert("client_name", client_name);
    vars.insert("lookback", lookback.as_str());
    vars.insert("spending_summary", summary.as_str());
    render(SPENDING_TEMPLATE, &vars)
}

/// Mustache-style `{{var}}` substitution
///
/// Substituted values are not rescanned, so a client name that happens to
/// contain `{{...}}` is emitted literally.
fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
