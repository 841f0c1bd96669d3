//! Banner carousel CLI - create, store and export banner bundles.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use console::style;
use serde::Serialize;

use bannerkit::cli::{self, AssetCommands, BannerCommands, Cli, Commands};
use bannerkit::codec::{ImageFetcher, encode_data_url};
use bannerkit::config::{API_KEY_ENV, Config};
use bannerkit::deck::SlideDeck;
use bannerkit::error::{BannerError, Result};
use bannerkit::export::{ExportOptions, build_banner_zip};
use bannerkit::generate::{GenerateClient, GenerateRequest};
use bannerkit::model::{Asset, Slide};
use bannerkit::store::StorageGateway;
use bannerkit::{image_ops, logging};

fn main() {
    let cli = Cli::parse();

    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
    }

    logging::init_logging(cli.use_json(), cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.data_dir.clone())?;

    match &cli.command {
        Commands::Asset { command } => match command {
            AssetCommands::Add(args) => cmd_asset_add(cli, &config, args),
            AssetCommands::List => cmd_asset_list(cli, &config),
            AssetCommands::Delete(args) => cmd_asset_delete(cli, &config, args),
        },
        Commands::Banner { command } => match command {
            BannerCommands::Save(args) => cmd_banner_save(cli, &config, args),
            BannerCommands::List => cmd_banner_list(cli, &config),
            BannerCommands::Delete(args) => cmd_banner_delete(cli, &config, args),
        },
        Commands::Export(args) => cmd_export(cli, &config, args),
        Commands::Generate(args) => cmd_generate(cli, &config, args),
        Commands::Usage => cmd_usage(cli, &config),
        Commands::Version => cmd_version(cli),
        Commands::Completions(args) => cmd_completions(args),
    }
}

fn open_gateway(config: &Config) -> StorageGateway {
    StorageGateway::open(&config.db_path(), &config.flat_dir(), config.flat_quota_bytes)
}

// === Assets ===

fn cmd_asset_add(cli: &Cli, config: &Config, args: &cli::AssetAddArgs) -> Result<()> {
    let mut bytes = std::fs::read(&args.file)?;
    let mut mime = mime_for_path(&args.file);

    if let Some(ratio) = args.fit {
        bytes = image_ops::fit_to_aspect(&bytes, ratio)?;
        mime = "image/png";
    }

    let name = args.name.clone().unwrap_or_else(|| {
        args.file
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned())
    });

    let asset = Asset::new(encode_data_url(&bytes, mime), name);
    open_gateway(config).save_asset(&asset)?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "id": asset.id,
                "name": asset.name,
                "uploadedAt": asset.uploaded_at,
            }),
        );
    } else {
        println!("Saved asset {} ({})", style(&asset.id).green(), asset.name);
    }
    Ok(())
}

fn cmd_asset_list(cli: &Cli, config: &Config) -> Result<()> {
    let assets = open_gateway(config).list_assets()?;

    if cli.use_json() {
        output_json(cli, &assets);
    } else if assets.is_empty() {
        println!("No stored assets");
    } else {
        for asset in &assets {
            println!(
                "{}  {}  {}",
                style(&asset.id).cyan(),
                asset.uploaded_at,
                asset.name
            );
        }
    }
    Ok(())
}

fn cmd_asset_delete(cli: &Cli, config: &Config, args: &cli::DeleteArgs) -> Result<()> {
    open_gateway(config).delete_asset(&args.id)?;

    if cli.use_json() {
        output_json(cli, &serde_json::json!({ "deleted": args.id }));
    } else {
        println!("Deleted asset {}", style(&args.id).cyan());
    }
    Ok(())
}

// === Banners ===

fn cmd_banner_save(cli: &Cli, config: &Config, args: &cli::BannerSaveArgs) -> Result<()> {
    let deck = SlideDeck::from_slides(read_manifest(&args.from)?);
    if deck.is_empty() {
        return Err(BannerError::Other("Manifest contains no slides".to_string()));
    }

    let banner = deck.freeze(args.ratio, args.name.clone());
    open_gateway(config).save_banner(&banner)?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "id": banner.id,
                "slides": banner.slides.len(),
                "aspectRatio": banner.aspect_ratio,
            }),
        );
    } else {
        println!(
            "Saved banner {} ({} slides, {})",
            style(&banner.id).green(),
            banner.slides.len(),
            banner.aspect_ratio
        );
    }
    Ok(())
}

fn cmd_banner_list(cli: &Cli, config: &Config) -> Result<()> {
    let banners = open_gateway(config).list_banners()?;

    if cli.use_json() {
        output_json(cli, &banners);
    } else if banners.is_empty() {
        println!("No saved banners");
    } else {
        for banner in &banners {
            println!(
                "{}  {}  {}  {} slides  {}",
                style(&banner.id).cyan(),
                banner.created_at,
                banner.aspect_ratio,
                banner.slides.len(),
                banner.name.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}

fn cmd_banner_delete(cli: &Cli, config: &Config, args: &cli::DeleteArgs) -> Result<()> {
    open_gateway(config).delete_banner(&args.id)?;

    if cli.use_json() {
        output_json(cli, &serde_json::json!({ "deleted": args.id }));
    } else {
        println!("Deleted banner {}", style(&args.id).cyan());
    }
    Ok(())
}

// === Export ===

fn cmd_export(cli: &Cli, config: &Config, args: &cli::ExportArgs) -> Result<()> {
    let (slides, aspect_ratio) = if let Some(id) = &args.banner {
        let banner = open_gateway(config)
            .list_banners()?
            .into_iter()
            .find(|b| b.id == *id)
            .ok_or_else(|| BannerError::Other(format!("Banner not found: {id}")))?;
        (banner.slides, banner.aspect_ratio)
    } else if let Some(path) = &args.from {
        (read_manifest(path)?, args.ratio)
    } else {
        return Err(BannerError::Other(
            "Provide --banner <ID> or --from <MANIFEST>".to_string(),
        ));
    };

    let autoplay = if args.autoplay {
        true
    } else if args.no_autoplay {
        false
    } else {
        config.autoplay
    };

    let options = ExportOptions {
        slides,
        aspect_ratio,
        autoplay,
        autoplay_speed: args.speed.unwrap_or(config.autoplay_speed),
    };

    let bytes = build_banner_zip(&options, &ImageFetcher::new())?;
    std::fs::write(&args.output, &bytes)?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "output": args.output.display().to_string(),
                "slides": options.slides.len(),
                "bytes": bytes.len(),
            }),
        );
    } else {
        println!(
            "Exported {} slides to {}",
            options.slides.len(),
            style(args.output.display()).green()
        );
    }
    Ok(())
}

// === Generation ===

fn cmd_generate(cli: &Cli, config: &Config, args: &cli::GenerateArgs) -> Result<()> {
    let endpoint = config.generate_endpoint.clone().ok_or_else(|| {
        BannerError::Generation(
            "no generation endpoint configured (set generate_endpoint in the config file)"
                .to_string(),
        )
    })?;

    let mut request = GenerateRequest::from_prompt(&args.prompt);
    if let Some(path) = &args.image {
        let bytes = std::fs::read(path)?;
        request = request.with_image(STANDARD.encode(&bytes), mime_for_path(path).to_string());
    }

    let client = GenerateClient::new(endpoint, std::env::var(API_KEY_ENV).ok());
    let image_url = client.generate(&request)?;

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| "Generated image".to_string());
    let asset = Asset::new(image_url, name);
    open_gateway(config).save_asset(&asset)?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({ "id": asset.id, "name": asset.name }),
        );
    } else {
        println!("Generated and saved asset {}", style(&asset.id).green());
    }
    Ok(())
}

// === Misc ===

fn cmd_usage(cli: &Cli, config: &Config) -> Result<()> {
    let gateway = open_gateway(config);
    let usage = gateway.storage_usage();

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "backend": if gateway.is_structured() { "structured" } else { "flat" },
                "used": usage.used,
                "quota": usage.quota,
            }),
        );
    } else {
        let backend = if gateway.is_structured() { "structured" } else { "flat" };
        println!("Backend: {backend}");
        println!("Used:    {} bytes", usage.used);
        if usage.quota > 0 {
            println!("Quota:   {} bytes", usage.quota);
        }
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(cli, &serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }));
    } else {
        println!("bannerkit {}", env!("CARGO_PKG_VERSION"));
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "bannerkit", &mut io::stdout());
    Ok(())
}

// === Utility Functions ===

fn read_manifest(path: &Path) -> Result<Vec<Slide>> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| BannerError::ConfigParse(format!("Invalid slide manifest: {e}")))
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

fn output_json<T: Serialize>(cli: &Cli, data: &T) {
    let json = if cli.use_compact_json() {
        serde_json::to_string(data).unwrap_or_default()
    } else {
        serde_json::to_string_pretty(data).unwrap_or_default()
    };
    println!("{json}");
}

fn output_error(cli: &Cli, error: &BannerError) {
    if cli.use_json() {
        let json = serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
    } else {
        eprintln!("{}: {error}", style("Error").red().bold());
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {suggestion}", style("Hint").yellow());
        }
    }
}
