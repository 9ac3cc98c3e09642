//! Spending aggregation over a lookback window
//!
//! Sums a client's recent transactions overall and per category. These
//! figures feed the system prompt and the summary API.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::Transaction;

/// Default lookback window for summaries, in months
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 3;

/// Aggregated spending for one client since `from_date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub client_id: i64,
    pub from_date: NaiveDate,
    pub transaction_count: usize,
    pub total: Decimal,
    pub by_category: HashMap<String, Decimal>,
}

impl SpendingSummary {
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}

/// First day included in a lookback window of `months` calendar months
///
/// Day-of-month overflow clamps to the end of the target month
/// (May 31 minus 3 months is Feb 28/29).
pub fn lookback_start(today: NaiveDate, months: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Add two amounts, failing instead of overflowing
fn checked_sum(acc: Decimal, amount: Decimal) -> Result<Decimal> {
    acc.checked_add(amount)
        .ok_or_else(|| Error::InvalidData(format!("Spending total overflows: {} + {}", acc, amount)))
}

/// Sum of all amounts
pub fn total_spending(txs: &[Transaction]) -> Result<Decimal> {
    txs.iter()
        .try_fold(Decimal::ZERO, |acc, t| checked_sum(acc, t.amount))
}

/// Sum of amounts grouped by category label (exact label match)
pub fn spending_by_category(txs: &[Transaction]) -> Result<HashMap<String, Decimal>> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for tx in txs {
        let total = totals.entry(tx.category.clone()).or_insert(Decimal::ZERO);
        *total = checked_sum(*total, tx.amount)?;
    }
    Ok(totals)
}

/// Sum of amounts for one category, matched case-insensitively
pub fn spending_for_category(txs: &[Transaction], category: &str) -> Result<Decimal> {
    txs.iter()
        .filter(|t| t.category.eq_ignore_ascii_case(category))
        .try_fold(Decimal::ZERO, |acc, t| checked_sum(acc, t.amount))
}

/// Build a summary from an already-fetched transaction list
pub fn summarize(
    client_id: i64,
    from_date: NaiveDate,
    txs: &[Transaction],
) -> Result<SpendingSummary> {
    Ok(SpendingSummary {
        client_id,
        from_date,
        transaction_count: txs.len(),
        total: total_spending(txs)?,
        by_category: spending_by_category(txs)?,
    })
}

/// Round to cents, halves away from zero (0.125 -> 0.13, -0.125 -> -0.13)
pub fn round_half_up(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render an amount with exactly two decimals after half-up rounding
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = round_half_up(amount);
    rounded.rescale(2);
    rounded.to_string()
}

impl Database {
    /// Summarize a client's spending for the `months` before `today`
    ///
    /// Does not check that the client exists; an unknown ID yields an empty summary.
    pub fn spending_summary(
        &self,
        client_id: i64,
        months: u32,
        today: NaiveDate,
    ) -> Result<SpendingSummary> {
        let from_date = lookback_start(today, months);
        let txs = self.recent_transactions(client_id, from_date)?;
        summarize(client_id, from_date, &txs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(category: &str, amount: &str) -> Transaction {
        Transaction {
            id: 0,
            client_id: 1,
            category: category.to_string(),
            description: None,
            amount: dec(amount),
            date: date("2024-03-01"),
        }
    }

    #[test]
    fn test_lookback_start() {
        assert_eq!(lookback_start(date("2024-06-15"), 3), date("2024-03-15"));
        assert_eq!(lookback_start(date("2024-02-10"), 3), date("2023-11-10"));
        // Clamps to the last day of a shorter month
        assert_eq!(lookback_start(date("2024-05-31"), 3), date("2024-02-29"));
        assert_eq!(lookback_start(date("2024-06-15"), 0), date("2024-06-15"));
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(total_spending(&[]).unwrap(), Decimal::ZERO);
        assert!(spending_by_category(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_spending_by_category() {
        let txs = vec![
            tx("Food", "10.555"),
            tx("Food", "5.00"),
            tx("Travel", "120.40"),
        ];

        let totals = spending_by_category(&txs).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Food"], dec("15.555"));
        assert_eq!(totals["Travel"], dec("120.40"));
        assert_eq!(total_spending(&txs).unwrap(), dec("135.955"));
        assert_eq!(format_amount(totals["Food"]), "15.56");
    }

    #[test]
    fn test_category_labels_are_exact_in_grouping() {
        let txs = vec![tx("food", "1.00"), tx("Food", "2.00")];
        let totals = spending_by_category(&txs).unwrap();
        assert_eq!(totals.len(), 2);
        // ...but single-category lookup ignores case
        assert_eq!(spending_for_category(&txs, "FOOD").unwrap(), dec("3.00"));
        assert_eq!(spending_for_category(&txs, "Rent").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_sums_are_errors() {
        let mut big = tx("Food", "0");
        big.amount = Decimal::MAX;
        let txs = vec![big.clone(), big];

        assert!(matches!(total_spending(&txs), Err(Error::InvalidData(_))));
        assert!(matches!(spending_by_category(&txs), Err(Error::InvalidData(_))));
        assert!(matches!(
            spending_for_category(&txs, "food"),
            Err(Error::InvalidData(_))
        ));
        assert!(summarize(1, date("2024-01-01"), &txs).is_err());
    }

    #[test]
    fn test_large_amounts_in_separate_categories_are_fine() {
        let mut food = tx("Food", "0");
        food.amount = Decimal::MAX;
        let mut refund = tx("Travel", "-1");
        refund.amount = Decimal::MIN;

        let totals = spending_by_category(&[food.clone(), refund.clone()]).unwrap();
        assert_eq!(totals["Food"], Decimal::MAX);
        assert_eq!(total_spending(&[food, refund]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(dec("0.125")), dec("0.13"));
        assert_eq!(round_half_up(dec("0.135")), dec("0.14"));
        assert_eq!(round_half_up(dec("-0.125")), dec("-0.13"));
        assert_eq!(round_half_up(dec("15.554")), dec("15.55"));
    }

    #[test]
    fn test_format_amount_pads_decimals() {
        assert_eq!(format_amount(dec("5")), "5.00");
        assert_eq!(format_amount(dec("5.1")), "5.10");
        assert_eq!(format_amount(dec("1234.005")), "1234.01");
    }

    #[test]
    fn test_summarize() {
        let txs = vec![tx("Food", "3.50"), tx("Health", "20")];
        let summary = summarize(7, date("2024-01-01"), &txs).unwrap();
        assert_eq!(summary.client_id, 7);
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.total, dec("23.50"));
        assert!(!summary.is_empty());

        let empty = summarize(7, date("2024-01-01"), &[]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.total, Decimal::ZERO);
    }
}
