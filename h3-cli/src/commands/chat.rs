//! Chat command - talk to the support assistant

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Input;

use h3_core::services::{ReplySource, SupportService};
use h3_core::LogEvent;

use super::{get_context, get_logger, log_event};
use crate::output;

const EXIT_WORDS: &[&str] = &["exit", "quit", "/exit", "/quit"];

fn print_reply(text: &str) {
    println!("{} {}\n", "Hura:".cyan().bold(), text);
}

async fn exchange(service: &mut SupportService, text: &str, json: bool) -> Result<()> {
    let Some((reply, source)) = service.send(text).await else {
        return Ok(());
    };
    let reply = reply.clone();

    if source == ReplySource::ErrorFallback {
        let mut event = LogEvent::new("assistant_unavailable").with_service("support");
        if let Some(err) = service.last_error() {
            event = event.with_error(err.to_string());
        }
        log_event(&get_logger(), event);
    }

    if json {
        println!("{}", serde_json::to_string(&reply)?);
    } else {
        print_reply(&reply.text);
    }
    Ok(())
}

pub async fn run(message: Option<String>, json: bool) -> Result<()> {
    let mut ctx = get_context()?;
    let service = &mut ctx.support_service;

    if let Some(message) = message {
        return exchange(service, &message, json).await;
    }

    if !output::is_interactive() {
        bail!("Pass a message to chat when not running interactively");
    }

    if service.assistant_name().is_none() {
        output::warning("No assistant API key configured; replies are offline.");
    }
    if let Some(greeting) = service.messages().first() {
        print_reply(&greeting.text);
    }
    println!("{}", "Type 'exit' to leave.".dimmed());

    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;
        if EXIT_WORDS.contains(&line.trim().to_lowercase().as_str()) {
            break;
        }
        exchange(service, &line, false).await?;
    }

    Ok(())
}
