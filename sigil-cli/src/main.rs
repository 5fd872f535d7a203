//! Sigil CLI - steganographic membership-card sealing tool.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use sigil_core::{Anchor, EmbedConfig, SealPlacement};
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

const EXIT_CODE_HELP: &str = "Exit codes:
  0   success
  1   general error
  65  card invalid or tampered
  66  cannot read or decode input
  74  cannot write output";

#[derive(Parser)]
#[command(name = "sigil")]
#[command(author, version, about = "Steganographic membership-card sealing", long_about = None)]
#[command(after_help = EXIT_CODE_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Corner of the card the seal is anchored to.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnchorArg {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<AnchorArg> for Anchor {
    fn from(arg: AnchorArg) -> Self {
        match arg {
            AnchorArg::TopLeft => Anchor::TopLeft,
            AnchorArg::TopRight => Anchor::TopRight,
            AnchorArg::BottomLeft => Anchor::BottomLeft,
            AnchorArg::BottomRight => Anchor::BottomRight,
        }
    }
}

/// Where the seal sits on the card. Issuance and scanning must agree.
#[derive(Args, Debug, Clone, Copy)]
struct PlacementArgs {
    /// Anchor corner for the seal
    #[arg(long, value_enum, default_value = "bottom-left")]
    anchor: AnchorArg,

    /// Padding between the seal and the card edge, in pixels
    #[arg(long, default_value_t = 10)]
    padding: u32,
}

impl PlacementArgs {
    fn placement(&self) -> SealPlacement {
        SealPlacement::new(self.anchor.into(), self.padding)
    }
}

/// Carrier configuration. Issuance and scanning must agree; it is not
/// recoverable from the image itself.
#[derive(Args, Debug, Clone, Copy)]
struct ConfigArgs {
    /// Number of leading pixel channels carrying payload bits (1-3)
    #[arg(long, default_value_t = 3)]
    channels: u8,

    /// Low-order bits written per channel (1-8)
    #[arg(long, default_value_t = 1)]
    bits_per_channel: u8,
}

impl ConfigArgs {
    fn config(&self) -> anyhow::Result<EmbedConfig> {
        Ok(EmbedConfig::new(self.channels, self.bits_per_channel)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a membership card with an embedded member record
    Issue {
        /// Member identifier to seal into the card
        #[arg(long)]
        member_id: String,

        /// Membership tier (Kids, Standard, Premium, or a numeric value)
        #[arg(long)]
        tier: String,

        /// Seal template image (lossless PNG)
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        /// Base card image (lossless PNG)
        #[arg(long, value_name = "FILE")]
        card: PathBuf,

        /// Output path for the composite card (defaults to <CARD>.sealed.png)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Hex-encoded secret token key (omit for unkeyed tokens)
        #[arg(long, value_name = "HEX")]
        key: Option<String>,

        #[command(flatten)]
        placement: PlacementArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Emit a JSON report on stdout
        #[arg(long)]
        json: bool,

        /// Suppress decorative output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Scan a card image and verify the embedded member record
    Scan {
        /// Card image to scan
        #[arg(value_name = "FILE")]
        card: PathBuf,

        /// Expected seal width in pixels
        #[arg(long, default_value_t = 64)]
        seal_width: u32,

        /// Expected seal height in pixels
        #[arg(long, default_value_t = 64)]
        seal_height: u32,

        /// Hex-encoded secret token key (omit for unkeyed tokens)
        #[arg(long, value_name = "HEX")]
        key: Option<String>,

        #[command(flatten)]
        placement: PlacementArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Emit a JSON report on stdout
        #[arg(long)]
        json: bool,

        /// Suppress decorative output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Report how large a member record a seal template can carry
    Capacity {
        /// Seal template image (lossless PNG)
        #[arg(value_name = "FILE")]
        template: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,

        /// Emit a JSON report on stdout
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Issue {
            member_id,
            tier,
            template,
            card,
            output,
            key,
            placement,
            config,
            json,
            quiet,
        } => {
            commands::issue::execute(commands::issue::IssueArgs {
                member_id,
                tier,
                template,
                card,
                output,
                key,
                placement: placement.placement(),
                config,
                json,
                quiet,
            })
            .await
        }
        Commands::Scan {
            card,
            seal_width,
            seal_height,
            key,
            placement,
            config,
            json,
            quiet,
        } => {
            commands::scan::execute(commands::scan::ScanArgs {
                card,
                seal_dims: (seal_width, seal_height),
                key,
                placement: placement.placement(),
                config,
                json,
                quiet,
            })
            .await
        }
        Commands::Capacity {
            template,
            config,
            json,
        } => commands::capacity::execute(template, config, json),
    };

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_codes::from_anyhow(&err) as u8)
        }
    }
}
