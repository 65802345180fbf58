//! Login, signup and logout commands

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::Input;

use h3_core::adapters::mock_identity::MOCK_SMS_CODE;
use h3_core::ports::SimulatedOp;
use h3_core::services::{LoginOutcome, ProfileForm};
use h3_core::{AccountKey, Language};

use super::get_context;
use crate::output;

/// Signup form fields; anything missing is prompted for
#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Email address to verify
    #[arg(long)]
    pub email: Option<String>,
    /// Title (Mr or Mrs)
    #[arg(long, default_value = "Mr")]
    pub title: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// Mobile number; becomes the login phone
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub postcode: Option<String>,
    #[arg(long, default_value = "Saudi Arabia")]
    pub country: String,
    #[arg(long)]
    pub bank_name: Option<String>,
    #[arg(long)]
    pub iban: Option<String>,
    /// Interface language (en or ar)
    #[arg(long)]
    pub language: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Use the given value, or prompt for it on a terminal
fn value_or_prompt(value: Option<String>, label: &str, flag: &str) -> Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }
    if !output::is_interactive() {
        bail!("--{} is required when not running interactively", flag);
    }
    Ok(Input::<String>::new().with_prompt(label).interact_text()?)
}

fn parse_language(language: Option<&str>) -> Result<Option<Language>> {
    Ok(language.map(str::parse::<Language>).transpose()?)
}

fn print_outcome(outcome: LoginOutcome, phone: &str, json: bool) -> Result<()> {
    let masked = AccountKey::from_phone(phone).masked();
    if json {
        println!(
            "{}",
            serde_json::json!({ "outcome": outcome, "account": masked })
        );
        return Ok(());
    }
    match outcome {
        LoginOutcome::Created => {
            output::success(&format!("Account created for {}", masked));
        }
        LoginOutcome::Resumed => {
            output::success(&format!("Welcome back ({})", masked));
        }
    }
    Ok(())
}

pub async fn run_login(
    phone: Option<String>,
    code: Option<String>,
    language: Option<String>,
    json: bool,
) -> Result<()> {
    let language = parse_language(language.as_deref())?;
    let mut ctx = get_context()?;

    let phone = value_or_prompt(phone, "Phone number", "phone")?;

    let expected =
        ctx.delay.duration(SimulatedOp::UserCheck) + ctx.delay.duration(SimulatedOp::SmsSend);
    let challenge = output::with_spinner(
        "Sending verification code...",
        expected,
        ctx.auth_service.request_login_code(&phone),
    )
    .await?;

    if !json {
        output::info(&format!(
            "Verification code sent to {}",
            AccountKey::from_phone(&phone).masked()
        ));
        if ctx.auth_service.verifier_name() == "mock" && code.is_none() {
            println!("{}", format!("(mock verifier: use {})", MOCK_SMS_CODE).dimmed());
        }
    }

    let code = value_or_prompt(code, "Verification code", "code")?;

    let expected =
        ctx.delay.duration(SimulatedOp::SmsVerify) + ctx.delay.duration(SimulatedOp::Login);
    let outcome = output::with_spinner(
        "Verifying...",
        expected,
        ctx.auth_service
            .confirm_login(&mut ctx.store, &challenge, &code, language),
    )
    .await?;

    print_outcome(outcome, &challenge.phone, json)
}

pub async fn run_signup(args: SignupArgs) -> Result<()> {
    let language = parse_language(args.language.as_deref())?;
    let mut ctx = get_context()?;

    let email = value_or_prompt(args.email, "Email", "email")?;
    output::with_spinner(
        "Sending verification email...",
        ctx.delay.duration(SimulatedOp::EmailSend),
        ctx.auth_service.start_signup(&email),
    )
    .await?;
    if !args.json {
        output::info("Verification email sent. Complete your profile to continue.");
    }

    let form = ProfileForm {
        title: args.title.parse()?,
        first_name: value_or_prompt(args.first_name, "First name", "first-name")?,
        last_name: value_or_prompt(args.last_name, "Last name", "last-name")?,
        mobile_number: value_or_prompt(args.mobile, "Mobile number", "mobile")?,
        address: value_or_prompt(args.address, "Address", "address")?,
        city: value_or_prompt(args.city, "City", "city")?,
        region: value_or_prompt(args.region, "Region", "region")?,
        postcode: value_or_prompt(args.postcode, "Postcode", "postcode")?,
        country: args.country,
        bank_name: value_or_prompt(args.bank_name, "Bank name", "bank-name")?,
        iban: value_or_prompt(args.iban, "IBAN", "iban")?,
        email,
    };

    let outcome = output::with_spinner(
        "Creating your profile...",
        ctx.delay.duration(SimulatedOp::ProfileSave),
        ctx.auth_service
            .complete_profile(&mut ctx.store, &form, language),
    )
    .await?;

    print_outcome(outcome, &form.mobile_number, args.json)
}

pub fn run_logout() -> Result<()> {
    let mut ctx = get_context()?;
    if !ctx.store.is_logged_in() {
        output::info("No active session");
        return Ok(());
    }
    ctx.store.logout()?;
    output::success("Logged out");
    Ok(())
}
