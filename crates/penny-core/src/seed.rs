//! Sample data for development
//!
//! Creates three demo clients with distinct spending habits and fills the
//! last three months with randomized daily transactions. Seeding only runs
//! against an empty clients table.

use chrono::{Days, Months, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::info;

use crate::db::Database;
use crate::error::Result;
use crate::models::{NewClient, NewTransaction};

/// Months of transaction history generated per client
pub const SEED_HISTORY_MONTHS: u32 = 3;

/// How freely a demo client spends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingProfile {
    Aggressive,
    Moderate,
    Conservative,
}

impl SpendingProfile {
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Self::Aggressive => &[
                "Clothes",
                "Food",
                "Entertainment",
                "Travel",
                "Electronics",
                "Gifts",
                "Health",
                "Private Transport",
            ],
            Self::Moderate => &[
                "Clothes",
                "Food",
                "Entertainment",
                "Travel",
                "Electronics",
                "Gifts",
                "Health",
            ],
            Self::Conservative => &[
                "Food",
                "Utilities",
                "Groceries",
                "Health",
                "Subscriptions",
                "Savings",
                "Public Transport",
            ],
        }
    }

    pub fn descriptions(&self) -> &'static [&'static str] {
        match self {
            Self::Aggressive => &[
                "Bought shoes",
                "Dinner out",
                "Concert tickets",
                "Flight to NYC",
                "New headphones",
                "Birthday gift",
                "Gym membership",
                "Fuel",
            ],
            Self::Moderate => &[
                "Bought jacket",
                "Groceries",
                "Movie night",
                "Weekend trip",
                "Phone case",
                "Gift card",
                "Pharmacy",
            ],
            Self::Conservative => &[
                "Cooked at home",
                "Electricity bill",
                "Weekly groceries",
                "Doctor visit",
                "Streaming service",
                "Monthly saving",
                "Bus fare",
            ],
        }
    }

    /// Inclusive range of transactions per day
    pub fn daily_transactions(&self) -> (u32, u32) {
        match self {
            Self::Aggressive => (3, 6),
            Self::Moderate => (1, 3),
            Self::Conservative => (0, 2),
        }
    }

    /// Inclusive range of a single amount, in whole dollars
    pub fn amount_range(&self) -> (i64, i64) {
        match self {
            Self::Aggressive => (20, 200),
            Self::Moderate => (10, 100),
            Self::Conservative => (5, 50),
        }
    }

    fn random_amount<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let (min, max) = self.amount_range();
        let cents = rng.gen_range(min * 100..=max * 100);
        Decimal::new(cents, 2)
    }

    fn random_transaction<R: Rng + ?Sized>(&self, rng: &mut R, date: NaiveDate) -> NewTransaction {
        let category = self.categories().choose(rng).copied().unwrap_or("Other");
        let amount = self.random_amount(rng);
        let tx = NewTransaction::new(category, amount, date);
        match self.descriptions().choose(rng) {
            Some(description) => tx.with_description(description),
            None => tx,
        }
    }
}

/// One demo client
struct SeedClient {
    name: &'static str,
    email: &'static str,
    joined_months_ago: u32,
    profile: SpendingProfile,
}

const SEED_CLIENTS: &[SeedClient] = &[
    SeedClient {
        name: "Alice",
        email: "alice@example.com",
        joined_months_ago: 6,
        profile: SpendingProfile::Aggressive,
    },
    SeedClient {
        name: "Bob",
        email: "bob@example.com",
        joined_months_ago: 8,
        profile: SpendingProfile::Moderate,
    },
    SeedClient {
        name: "Carol",
        email: "carol@example.com",
        joined_months_ago: 10,
        profile: SpendingProfile::Conservative,
    },
];

/// What a seeding run inserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub clients: usize,
    pub transactions: usize,
}

/// Generate a profile's transactions for every day in `start..=end`
pub fn generate_transactions<R: Rng + ?Sized>(
    profile: SpendingProfile,
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut R,
) -> Vec<NewTransaction> {
    let (min_tx, max_tx) = profile.daily_transactions();
    let mut txs = Vec::new();

    let mut date = start;
    while date <= end {
        let count = rng.gen_range(min_tx..=max_tx);
        for _ in 0..count {
            txs.push(profile.random_transaction(rng, date));
        }
        date = match date.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }

    txs
}

/// Seed the demo clients and their history
///
/// Returns `None` without touching the store if any client already exists.
pub fn seed_sample_data<R: Rng + ?Sized>(
    db: &Database,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Option<SeedReport>> {
    let existing = db.count_clients()?;
    if existing > 0 {
        info!(existing, "Clients already present, skipping sample data");
        return Ok(None);
    }

    let start = today
        .checked_sub_months(Months::new(SEED_HISTORY_MONTHS))
        .unwrap_or(today);

    let mut report = SeedReport::default();
    for seed in SEED_CLIENTS {
        let joined = today
            .checked_sub_months(Months::new(seed.joined_months_ago))
            .unwrap_or(today);
        let client_id = db.insert_client(&NewClient::new(seed.name, joined).with_email(seed.email))?;

        let txs = generate_transactions(seed.profile, start, today, rng);
        let inserted = db.insert_transactions(client_id, &txs)?;

        info!(client = seed.name, client_id, transactions = inserted, "Seeded client");
        report.clients += 1;
        report.transactions += inserted;
    }

    Ok(Some(report))
}
