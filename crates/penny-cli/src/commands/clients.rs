//! Client command implementations

use anyhow::Result;
use chrono::Local;
use penny_core::spending::format_amount;
use penny_core::Database;

pub fn cmd_clients(db: &Database, json: bool) -> Result<()> {
    let clients = db.list_clients()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&clients)?);
        return Ok(());
    }

    if clients.is_empty() {
        println!("No clients yet. Run `penny seed` to load demo data.");
        return Ok(());
    }

    println!("{:>4}  {:<20} {:<28} {}", "ID", "Name", "Email", "Joined");
    println!("{}", "-".repeat(66));
    for client in &clients {
        println!(
            "{:>4}  {:<20} {:<28} {}",
            client.id,
            client.name,
            client.email.as_deref().unwrap_or("-"),
            client.joined_date
        );
    }

    Ok(())
}

pub fn cmd_summary(db: &Database, client_id: i64, months: u32, json: bool) -> Result<()> {
    let client = db.require_client(client_id)?;
    let summary = db.spending_summary(client_id, months, Local::now().date_naive())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "📊 Spending for {} since {} ({} transactions)",
        client.name, summary.from_date, summary.transaction_count
    );

    if summary.is_empty() {
        println!("   No transactions in the last {} month(s).", months);
        return Ok(());
    }

    let mut categories: Vec<_> = summary.by_category.iter().collect();
    categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (category, amount) in categories {
        println!("   {:<20} ${:>10}", category, format_amount(*amount));
    }
    println!("   {}", "-".repeat(32));
    println!("   {:<20} ${:>10}", "Total", format_amount(summary.total));

    Ok(())
}
