//! Card command - issue and manage virtual cards

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use dialoguer::Confirm;

use h3_core::ports::SimulatedOp;
use h3_core::{CardColor, CardNetwork, CardStatus, VirtualCard};

use super::get_session_context;
use crate::output::{self, create_table};

#[derive(Subcommand)]
pub enum CardCommands {
    /// Issue a new virtual card
    Issue {
        /// Card network (visa or mastercard)
        #[arg(long, default_value = "visa")]
        network: String,
        /// Card design (silver, black or gold)
        #[arg(long, default_value = "black")]
        color: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List cards
    List {
        /// Show full card numbers and CVVs
        #[arg(long)]
        reveal: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Freeze an active card or unfreeze a frozen one
    Freeze {
        /// Card id or unique id prefix
        id: String,
    },
    /// Remove a card
    Remove {
        /// Card id or unique id prefix
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

fn short_id(card: &VirtualCard) -> String {
    card.id.to_string().chars().take(8).collect()
}

pub async fn run(command: CardCommands) -> Result<()> {
    match command {
        CardCommands::Issue { network, color, json } => {
            let network: CardNetwork = network.parse()?;
            let color: CardColor = color.parse()?;
            let mut ctx = get_session_context()?;

            let card = output::with_spinner(
                "Issuing card...",
                ctx.delay.duration(SimulatedOp::CardIssue),
                ctx.card_service.issue(&mut ctx.store, network, color),
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&card)?);
            } else {
                output::success(&format!(
                    "Issued {} {} card {}",
                    card.color,
                    card.network,
                    card.masked_number()
                ));
                println!("  Id: {}  Expires: {}", short_id(&card), card.expiry);
            }
        }
        CardCommands::List { reveal, json } => {
            let ctx = get_session_context()?;
            let cards = ctx.store.cards();

            if json {
                println!("{}", serde_json::to_string_pretty(cards)?);
                return Ok(());
            }
            if cards.is_empty() {
                println!("No cards yet. Run 'h3 card issue' to create one.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["Id", "Network", "Number", "Expiry", "CVV", "Color", "Status"]);
            for card in cards {
                let (number, cvv) = if reveal {
                    (card.formatted_number(), card.cvv.clone())
                } else {
                    (card.masked_number(), "•••".to_string())
                };
                let status = Cell::new(card.status).fg(match card.status {
                    CardStatus::Active => Color::Green,
                    CardStatus::Frozen => Color::Blue,
                });
                table.add_row(vec![
                    Cell::new(short_id(card)),
                    Cell::new(card.network),
                    Cell::new(number),
                    Cell::new(card.expiry),
                    Cell::new(cvv),
                    Cell::new(card.color),
                    status,
                ]);
            }
            println!("{}", table);
        }
        CardCommands::Freeze { id } => {
            let mut ctx = get_session_context()?;
            let card_id = ctx.card_service.find(&ctx.store, &id)?.id;
            let status = ctx.card_service.toggle(&mut ctx.store, card_id)?;
            match status {
                CardStatus::Frozen => println!("Card {} is now {}", &id, "FROZEN".blue()),
                CardStatus::Active => println!("Card {} is now {}", &id, "ACTIVE".green()),
            }
        }
        CardCommands::Remove { id, force } => {
            let mut ctx = get_session_context()?;
            let card = ctx.card_service.find(&ctx.store, &id)?;
            let card_id = card.id;

            if !force && output::is_interactive() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove card {}?", card.masked_number()))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("{}", "Cancelled".dimmed());
                    return Ok(());
                }
            }

            ctx.card_service.remove(&mut ctx.store, card_id)?;
            output::success("Card removed");
        }
    }

    Ok(())
}
