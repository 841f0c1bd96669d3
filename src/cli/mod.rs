//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::AspectRatio;

/// Banner carousel toolkit - create, store and export banner bundles.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "bannerkit", version, about, long_about = None)]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "BANNERKIT_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (repeat for more detail)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Override the data directory (database and fallback files)
    #[arg(long, global = true, env = "BANNERKIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON.
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored image assets
    Asset {
        #[command(subcommand)]
        command: AssetCommands,
    },

    /// Manage saved banners
    Banner {
        #[command(subcommand)]
        command: BannerCommands,
    },

    /// Export slides as a self-contained static bundle
    Export(ExportArgs),

    /// Generate an image and store it as an asset
    Generate(GenerateArgs),

    /// Show storage usage
    Usage,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Asset subcommands.
#[derive(Subcommand, Debug)]
pub enum AssetCommands {
    /// Import an image file as a stored asset
    Add(AssetAddArgs),

    /// List stored assets
    List,

    /// Delete an asset by id
    Delete(DeleteArgs),
}

/// Banner subcommands.
#[derive(Subcommand, Debug)]
pub enum BannerCommands {
    /// Save a banner from a slide manifest
    Save(BannerSaveArgs),

    /// List saved banners
    List,

    /// Delete a banner by id
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct AssetAddArgs {
    /// Image file to import
    pub file: PathBuf,

    /// Display name (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Center-crop to this aspect ratio before storing
    #[arg(long)]
    pub fit: Option<AspectRatio>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct BannerSaveArgs {
    /// Slide manifest: a JSON array of slides
    #[arg(long)]
    pub from: PathBuf,

    /// Banner aspect ratio
    #[arg(long, default_value = "16:9")]
    pub ratio: AspectRatio,

    /// Banner display name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Saved banner id to export
    #[arg(long, conflicts_with = "from")]
    pub banner: Option<String>,

    /// Slide manifest to export directly (JSON array of slides)
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// Output archive path
    #[arg(long, short = 'o', default_value = "banner-bundle.zip")]
    pub output: PathBuf,

    /// Aspect ratio (manifest exports; saved banners carry their own)
    #[arg(long, default_value = "16:9")]
    pub ratio: AspectRatio,

    /// Enable autoplay in the exported carousel
    #[arg(long, conflicts_with = "no_autoplay")]
    pub autoplay: bool,

    /// Disable autoplay (overrides the configured default)
    #[arg(long)]
    pub no_autoplay: bool,

    /// Autoplay interval in seconds (defaults from config)
    #[arg(long)]
    pub speed: Option<u32>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Prompt text
    pub prompt: String,

    /// Reference image for image-to-image generation
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Display name for the stored asset
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_robot_implies_json() {
        let cli = Cli::parse_from(["bannerkit", "--robot", "usage"]);
        assert!(cli.use_json());
        assert!(!cli.use_compact_json());
    }

    #[test]
    fn test_ratio_value_parses() {
        let cli = Cli::parse_from([
            "bannerkit", "export", "--from", "slides.json", "--ratio", "3:1",
        ]);
        match cli.command {
            Commands::Export(args) => assert_eq!(args.ratio, AspectRatio::Ratio3x1),
            _ => panic!("expected export command"),
        }
    }
}
