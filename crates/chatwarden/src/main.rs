//! `chatwarden` - inspect and curate contact tiers from the shell.
//!
//! Operates on the same files the auto-responder uses, so changes made here
//! are picked up on its next reload.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod command;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use chatwarden_core::{ContactInfo, ContactTierService, StorePaths};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clap::Parser;
use command::{Cli, Command, ContactArgs, TierContactArgs};

/// Environment variable overriding the data directory.
const DATA_DIR_ENV: &str = "CHATWARDEN_DATA_DIR";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatwarden=info,chatwarden_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let data_dir = data_dir(
        cli.data_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from)),
    );
    debug!(path = %data_dir.display(), "Using data directory");

    let service = ContactTierService::open(StorePaths::in_dir(&data_dir))
        .await
        .with_context(|| format!("failed to load configuration from {}", data_dir.display()))?;

    run(&service, cli.command, &mut io::stdout().lock()).await
}

/// Resolve the data directory: explicit override, platform data dir, or `./chatwarden`.
fn data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatwarden")
    })
}

/// Execute one command against the service.
async fn run(
    service: &ContactTierService,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Categorize(ContactArgs { name, phone }) => {
            let info = service.contact_info(&name, phone.as_deref());
            write_contact(out, &info)?;
        }
        Command::Add(TierContactArgs {
            tier,
            contact: ContactArgs { name, phone },
        }) => {
            service
                .add_contact(tier, &name, phone.as_deref())
                .await
                .context("failed to save the ruleset")?;
            info!(%tier, name = %name, "Contact added");
            writeln!(out, "added {name} to {tier}")?;
        }
        Command::Remove(TierContactArgs {
            tier,
            contact: ContactArgs { name, phone },
        }) => {
            service
                .remove_contact(tier, &name, phone.as_deref())
                .await
                .context("failed to save the ruleset")?;
            info!(%tier, name = %name, "Contact removed");
            writeln!(out, "removed {name} from {tier}")?;
        }
        Command::Template {
            name,
            phone,
            template,
        } => {
            let text = service.get_template(&name, phone.as_deref(), &template);
            writeln!(out, "{text}")?;
        }
        Command::Prompt(ContactArgs { name, phone }) => {
            writeln!(out, "{}", service.get_ai_prompt(&name, phone.as_deref()))?;
        }
        Command::Stats => {
            for (tier, stats) in service.tier_statistics() {
                writeln!(
                    out,
                    "{:<20} names: {:>3}  phones: {:>3}  keywords: {:>3}  total: {:>3}",
                    tier.as_str(),
                    stats.by_name,
                    stats.by_phone,
                    stats.by_keyword,
                    stats.total
                )?;
            }
        }
        Command::Skipped(ContactArgs { name, phone }) => {
            let skipped = service.is_skipped(&name, phone.as_deref());
            writeln!(out, "{}", if skipped { "skipped" } else { "not skipped" })?;
        }
    }

    Ok(())
}

fn write_contact(out: &mut impl Write, info: &ContactInfo) -> io::Result<()> {
    let settings = &info.settings;
    let matched = info
        .matched_by
        .as_ref()
        .map_or_else(|| "default tier".to_string(), ToString::to_string);

    writeln!(out, "tier:           {} ({})", info.tier, info.tier.display_name())?;
    writeln!(out, "matched by:     {matched}")?;
    writeln!(out, "reply mode:     {}", settings.reply_mode.as_str())?;
    writeln!(out, "priority:       {}", settings.priority_level.as_str())?;
    writeln!(out, "open and read:  {}", settings.open_and_read)?;
    writeln!(out, "play sound:     {}", settings.play_sound)?;
    writeln!(out, "mark as read:   {}", settings.mark_as_read)
}
