use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "reconcile",
    about = "Reconcile freshly collected person records with persisted ones",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the operations that would layer NEW onto OLD
    Diff(DiffArgs),
    /// Merge NEW into OLD and print or write the result
    Merge(MergeArgs),
    /// Merge only the contact office lists of two records
    Contacts(ContactsArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Persisted record (JSON)
    pub old: PathBuf,
    /// Freshly collected record (JSON)
    pub new: PathBuf,
    #[arg(long)]
    pub keep_both_ids: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    #[arg(long)]
    pub keep_both_ids: bool,
    /// Merge policy file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Write the merged record here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Print a line diff between OLD and the merged record
    #[arg(long)]
    pub show_diff: bool,
}

#[derive(Args)]
pub struct ContactsArgs {
    pub old: PathBuf,
    pub new: PathBuf,
}
