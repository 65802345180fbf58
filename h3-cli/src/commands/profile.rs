//! Profile command - view and edit the signed-in profile

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use h3_core::{AccountKey, ProfileUpdate};

use super::get_session_context;
use crate::output::{self, create_table, format_money};

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show profile details
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields
    Update(UpdateArgs),
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Title (Mr or Mrs)
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// New phone number; moves the account to the new number
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub bank_name: Option<String>,
    #[arg(long)]
    pub iban: Option<String>,
    /// Interface language (en or ar)
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub postcode: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    /// Enable or disable biometric sign-in
    #[arg(long)]
    pub biometric: Option<bool>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl UpdateArgs {
    fn to_update(&self, current_first: &str, current_last: &str) -> Result<ProfileUpdate> {
        let title = self.title.as_deref().map(str::parse).transpose()?;
        let language = self.language.as_deref().map(str::parse).transpose()?;

        // Display name follows the first/last pair
        let name = if self.first_name.is_some() || self.last_name.is_some() {
            let first = self.first_name.as_deref().unwrap_or(current_first);
            let last = self.last_name.as_deref().unwrap_or(current_last);
            Some(format!("{} {}", first, last).trim().to_string())
        } else {
            None
        };

        Ok(ProfileUpdate {
            title,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            name,
            email: self.email.clone(),
            phone_number: self.phone.clone(),
            biometric_enabled: self.biometric,
            bank_name: self.bank_name.clone(),
            iban: self.iban.clone(),
            language,
            address: self.address.clone(),
            city: self.city.clone(),
            region: self.region.clone(),
            postcode: self.postcode.clone(),
            country: self.country.clone(),
            ..Default::default()
        })
    }
}

pub fn run(command: ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::Show { json } => run_show(json),
        ProfileCommands::Update(args) => run_update(args),
    }
}

fn run_show(json: bool) -> Result<()> {
    let ctx = get_session_context()?;
    let Some(user) = ctx.store.user() else {
        bail!("Not logged in. Run 'h3 login' first.");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
        return Ok(());
    }

    let yes_no = |b: bool| if b { "Yes" } else { "No" };
    let mut table = create_table();
    let rows: Vec<(&str, String)> = vec![
        ("Name", format!("{} {}", user.title, user.name)),
        ("Email", user.email.clone()),
        ("Phone", AccountKey::from_phone(&user.phone_number).masked()),
        ("Balance", format_money(user.balance, &user.currency)),
        ("Bank", user.bank_name.clone()),
        ("IBAN", user.iban.clone()),
        ("Address", user.address.clone()),
        ("City", user.city.clone()),
        ("Region", user.region.clone()),
        ("Postcode", user.postcode.clone()),
        ("Country", user.country.clone()),
        ("Language", user.language.as_str().to_string()),
        ("KYC verified", yes_no(user.kyc_verified).to_string()),
        ("Biometric", yes_no(user.biometric_enabled).to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }

    println!("{}", table);
    Ok(())
}

fn run_update(args: UpdateArgs) -> Result<()> {
    let mut ctx = get_session_context()?;
    let (first, last) = match ctx.store.user() {
        Some(u) => (u.first_name.clone(), u.last_name.clone()),
        None => bail!("Not logged in. Run 'h3 login' first."),
    };

    let update = args.to_update(&first, &last)?;
    if update.is_empty() {
        bail!("Nothing to update. Pass at least one field, e.g. --email");
    }

    if !ctx.store.update_user(&update)? {
        bail!("Not logged in. Run 'h3 login' first.");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ctx.store.user())?);
        return Ok(());
    }

    output::success("Profile updated");
    if let Some(phone) = &update.phone_number {
        println!(
            "{}",
            format!("Account moved to {}", AccountKey::from_phone(phone).masked()).dimmed()
        );
    }
    Ok(())
}
