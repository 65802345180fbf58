//! Transfer and zakat commands

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use rust_decimal::Decimal;

use h3_core::ports::SimulatedOp;
use h3_core::{H3Context, OperationResult, Transaction};

use super::get_session_context;
use crate::output::{self, format_money};

/// Default zakat recipient
const ZAKAT_RECIPIENT: &str = "Global Relief Fund";

fn confirm(prompt: &str, yes: bool, json: bool) -> Result<bool> {
    if yes || json || !output::is_interactive() {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

/// Print the outcome of a debit; JSON output carries failures too
fn report(
    ctx: &H3Context,
    result: h3_core::domain::result::Result<Transaction>,
    currency: &str,
    json: bool,
) -> Result<()> {
    let balance = ctx.store.user().map(|u| u.balance).unwrap_or_default();

    if json {
        let out = OperationResult::from(result)
            .with_context("balance", serde_json::json!(balance))
            .with_context("currency", serde_json::json!(currency));
        println!("{}", serde_json::to_string_pretty(&out)?);
        if let Some(error) = out.error {
            bail!(error);
        }
        return Ok(());
    }

    let tx = result?;
    println!(
        "\n{} {} sent to {}",
        "✓".green(),
        format_money(tx.amount.abs(), currency),
        tx.recipient.as_deref().unwrap_or("")
    );
    println!("  New balance: {}\n", format_money(balance, currency));
    Ok(())
}

pub async fn run(recipient: &str, amount: &str, yes: bool, json: bool) -> Result<()> {
    let amount = Decimal::from_str(amount.trim())
        .with_context(|| format!("Invalid amount: {}", amount))?;

    let mut ctx = get_session_context()?;
    let currency = ctx
        .store
        .user()
        .map(|u| u.currency.clone())
        .unwrap_or_default();

    let prompt = format!(
        "Send {} to {}?",
        format_money(amount, &currency),
        recipient.trim()
    );
    if !confirm(&prompt, yes, json)? {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    let result = output::with_spinner(
        "Processing transfer...",
        ctx.delay.duration(SimulatedOp::Transfer),
        ctx.transfer_service.transfer(&mut ctx.store, recipient, amount),
    )
    .await;

    report(&ctx, result, &currency, json)
}

pub async fn run_zakat(recipient: Option<String>, pay: bool, yes: bool, json: bool) -> Result<()> {
    let mut ctx = get_session_context()?;
    let (due, currency) = ctx
        .store
        .user()
        .map(|u| (u.zakat_due(), u.currency.clone()))
        .unwrap_or_default();

    if !pay {
        if json {
            println!("{}", serde_json::json!({ "zakatDue": due, "currency": currency }));
        } else {
            println!("Zakat due (2.5%): {}", format_money(due, &currency).bold());
            if !due.is_zero() {
                println!("{}", "Run 'h3 zakat --pay' to pay it now.".dimmed());
            }
        }
        return Ok(());
    }

    let recipient = recipient.unwrap_or_else(|| ZAKAT_RECIPIENT.to_string());
    let prompt = format!("Pay {} zakat to {}?", format_money(due, &currency), recipient);
    if !confirm(&prompt, yes, json)? {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    let result = output::with_spinner(
        "Paying zakat...",
        ctx.delay.duration(SimulatedOp::Transfer),
        ctx.transfer_service.pay_zakat(&mut ctx.store, &recipient),
    )
    .await;

    report(&ctx, result, &currency, json)
}
