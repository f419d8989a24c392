//! Command-line parsing.

use std::path::PathBuf;

use chatwarden_core::Tier;
use clap::{Args, Parser, Subcommand};

/// Inspect and curate contact tiers.
#[derive(Debug, Parser)]
#[command(name = "chatwarden", version)]
#[command(
    about = "Inspect and curate contact tiers",
    after_help = "Tiers: main_contacts, time_pass_contacts, not_important\n\n\
                  Files are kept in --data-dir, $CHATWARDEN_DATA_DIR, or the platform data directory."
)]
pub struct Cli {
    /// Directory holding the ruleset, template and skip list files.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the tier and settings of a contact.
    Categorize(ContactArgs),
    /// Add a contact to a tier.
    Add(TierContactArgs),
    /// Remove a contact from a tier.
    Remove(TierContactArgs),
    /// Show the reply template for a contact.
    Template {
        /// Contact name.
        name: String,
        /// Template name, e.g. `busy`.
        template: String,
        /// Phone number.
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the AI prompt for a contact.
    Prompt(ContactArgs),
    /// Show per-tier entry counts.
    Stats,
    /// Check the skip list.
    Skipped(ContactArgs),
}

/// A contact identified by name and optional phone.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ContactArgs {
    /// Contact name.
    pub name: String,
    /// Phone number.
    pub phone: Option<String>,
}

/// A contact plus the tier to change.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct TierContactArgs {
    /// Tier key.
    #[arg(value_parser = parse_tier)]
    pub tier: Tier,
    #[command(flatten)]
    pub contact: ContactArgs,
}

fn parse_tier(value: &str) -> Result<Tier, String> {
    Tier::parse(value).ok_or_else(|| {
        format!("unknown tier '{value}' (expected main_contacts, time_pass_contacts or not_important)")
    })
}
