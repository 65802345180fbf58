//! Status command - dashboard summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;
use crate::output::format_money;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.summary(&ctx.store);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let Some(user) = status.user else {
        println!("Not logged in. Run 'h3 login' or 'h3 signup'.");
        if status.demo_mode {
            println!("Demo mode is {}", "ON".green());
        }
        return Ok(());
    };

    let heading = if user.name.trim().is_empty() {
        "H3 Account".to_string()
    } else {
        user.name.clone()
    };
    println!("{}", heading.bold());
    if status.demo_mode {
        println!("{}", "Demo mode".yellow());
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let kyc = if user.kyc_verified { "Verified" } else { "Pending" };
    table.add_row(vec!["Phone", user.masked_phone.as_str()]);
    table.add_row(vec![
        "Available balance".to_string(),
        format_money(user.balance, &user.currency),
    ]);
    table.add_row(vec![
        "Zakat due (2.5%)".to_string(),
        format_money(user.zakat_due, &user.currency),
    ]);
    table.add_row(vec!["KYC", kyc]);
    table.add_row(vec!["Language", user.language.as_str()]);
    table.add_row(vec![
        "Transactions".to_string(),
        user.transaction_count.to_string(),
    ]);
    table.add_row(vec![
        "Cards".to_string(),
        format!("{} active, {} frozen", user.cards.active, user.cards.frozen),
    ]);

    println!("{}", table);
    Ok(())
}
