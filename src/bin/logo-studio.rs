//! CLI for Logo Studio - Honest Locksmiths logo generation.

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand, ValueEnum};
use logo_studio::{
    ApiKeySlot, CredentialGateway, GeminiLogoClient, KeyPrompt, SlotCredentialHost,
    StudioController, StudioState, DEFAULT_PROMPT,
};
use logo_studio::{ImageGenerator, ImageResolution};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "logo-studio")]
#[command(about = "Generate Honest Locksmiths logos with Gemini 3 Pro Image")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Override the Gemini API root
    #[arg(long, global = true, env = "LOGO_STUDIO_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a logo from a text prompt
    Generate(GenerateArgs),

    /// Report whether an API key is selected
    KeyStatus,
}

#[derive(Args)]
struct GenerateArgs {
    /// The concept prompt describing the logo
    prompt: Option<String>,

    /// Output file path (defaults to the download file name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resolution tier
    #[arg(short, long, value_enum, default_value = "1K")]
    resolution: ResolutionArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResolutionArg {
    #[value(name = "1K", alias = "low")]
    Low,
    #[value(name = "2K", alias = "medium")]
    Medium,
    #[value(name = "4K", alias = "high")]
    High,
}

impl From<ResolutionArg> for ImageResolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Low => ImageResolution::Low,
            ResolutionArg::Medium => ImageResolution::Medium,
            ResolutionArg::High => ImageResolution::High,
        }
    }
}

/// Reads a key from the terminal. An empty line cancels.
struct TerminalKeyPrompt;

#[async_trait]
impl KeyPrompt for TerminalKeyPrompt {
    async fn prompt_for_key(&self) -> Option<String> {
        // stdin blocks, so keep it off the runtime workers
        tokio::task::spawn_blocking(read_key_line)
            .await
            .ok()
            .flatten()
    }
}

fn read_key_line() -> Option<String> {
    let mut stderr = io::stderr();
    let _ = write!(stderr, "Gemini API key (empty to cancel): ");
    let _ = stderr.flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let key = line.trim();
            (!key.is_empty()).then(|| key.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let slot = ApiKeySlot::from_env();
    let host = Arc::new(SlotCredentialHost::new(slot.clone(), TerminalKeyPrompt));
    let mut builder = GeminiLogoClient::builder().key_slot(slot);
    if let Some(url) = cli.base_url.clone() {
        builder = builder.base_url(url);
    }
    let studio = StudioController::new(builder.build(), CredentialGateway::new(host));

    match cli.command {
        Commands::Generate(args) => generate_logo(&studio, args, cli.json).await?,
        Commands::KeyStatus => key_status(&studio, cli.json).await?,
    }

    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("logo_studio=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn generate_logo<G: ImageGenerator>(
    studio: &StudioController<G>,
    args: GenerateArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    studio.initialize().await;
    studio
        .set_prompt(args.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string()))
        .await;
    studio.set_resolution(args.resolution.into()).await;

    studio.submit().await;
    if studio.is_key_prompt_visible().await {
        show_access_required();
        if !studio.select_credential().await {
            anyhow::bail!("no API key selected");
        }
        studio.submit().await;
    }

    match studio.state().await {
        StudioState::Success => {}
        StudioState::Failed(message) => anyhow::bail!(message),
        StudioState::AwaitingCredential => anyhow::bail!("API key was rejected"),
        other => anyhow::bail!("unexpected studio state: {other:?}"),
    }

    let Some(image) = studio.current_image().await else {
        anyhow::bail!("no image available");
    };
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(image.download_file_name()));
    image.save(&output)?;

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "output": output.display().to_string(),
            "model": studio.generator().model(),
            "resolution": image.resolution,
            "prompt": image.prompt,
            "created_at": image.created_at.to_rfc3339(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated logo: {} ({}) via {}",
            output.display(),
            image.resolution,
            studio.generator().model()
        );
    }

    Ok(())
}

fn show_access_required() {
    eprintln!();
    eprintln!("Access Required");
    eprintln!("To generate high-definition 4K logos using Nano Banana Pro, please select your API key.");
    eprintln!("Note: This feature uses the premium Gemini 3 Pro Image Preview model.");
    eprintln!("Billing: https://ai.google.dev/gemini-api/docs/billing");
    eprintln!();
}

async fn key_status<G: ImageGenerator>(
    studio: &StudioController<G>,
    json_output: bool,
) -> anyhow::Result<()> {
    let state = studio.initialize().await;

    if json_output {
        let result = serde_json::json!({
            "has_key": state.has_key,
            "model": studio.generator().model(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if state.has_key {
        println!("API key selected ({})", studio.generator().model());
    } else {
        println!("No API key selected. Set API_KEY, GEMINI_API_KEY or GOOGLE_API_KEY.");
    }

    Ok(())
}
