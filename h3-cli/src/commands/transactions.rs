//! Transactions command - session transaction history

use anyhow::Result;
use comfy_table::{Cell, Color};

use super::get_session_context;
use crate::output::{create_table, format_money};

pub fn run(limit: usize, json: bool) -> Result<()> {
    let ctx = get_session_context()?;
    let transactions: Vec<_> = ctx.store.transactions().iter().take(limit).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions in this session.");
        return Ok(());
    }

    let currency = ctx
        .store
        .user()
        .map(|u| u.currency.as_str())
        .unwrap_or("USD");

    let mut table = create_table();
    table.set_header(vec!["Date", "Type", "Counterparty", "Description", "Amount", "Status"]);
    for tx in transactions {
        let amount = Cell::new(format_money(tx.amount, currency)).fg(if tx.is_outflow() {
            Color::Red
        } else {
            Color::Green
        });
        table.add_row(vec![
            Cell::new(&tx.date),
            Cell::new(tx.tx_type),
            Cell::new(tx.counterparty().unwrap_or("")),
            Cell::new(tx.description.as_deref().unwrap_or("")),
            amount,
            Cell::new(tx.status),
        ]);
    }

    println!("{}", table);
    Ok(())
}
