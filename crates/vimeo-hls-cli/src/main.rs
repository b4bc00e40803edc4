//! vimeo-hls CLI - companion tool for the embeddable player
//!
//! Features:
//! - Vimeo id/URL normalization
//! - HLS manifest resolution (public embed page, then authenticated API)
//! - Player stylesheet export
//! - Embed snippet generation

use clap::{Parser, Subcommand};

mod commands;
mod output;

/// vimeo-hls CLI - Vimeo/HLS player toolkit
#[derive(Parser)]
#[command(name = "vimeo-hls-cli")]
#[command(version)]
#[command(about = "Resolve Vimeo HLS streams and generate player embeds", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a Vimeo id or URL to its HLS manifest
    Resolve {
        /// Vimeo video id or URL
        input: String,

        /// Vimeo API access token for the authenticated fallback
        #[arg(short, long, env = "VIMEO_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Print the numeric id from a Vimeo URL
    ExtractId {
        /// Vimeo video id or URL
        input: String,
    },

    /// Print the player stylesheet
    Css,

    /// Print an HTML snippet that embeds the player
    Embed {
        /// Vimeo id/URL, or an HLS manifest URL
        source: String,

        /// Start playback once the manifest is parsed
        #[arg(long)]
        autoplay: bool,

        /// Start muted
        #[arg(long)]
        muted: bool,

        /// Hide the control overlay
        #[arg(long)]
        no_controls: bool,

        /// Aspect ratio as W:H
        #[arg(short, long, default_value = "16:9")]
        aspect_ratio: String,

        /// Poster image URL
        #[arg(short, long)]
        poster: Option<String>,

        /// Path of the generated wasm-bindgen JS module
        #[arg(short, long, default_value = "./vimeo_hls_wasm.js")]
        module: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve { input, token } => {
            commands::resolve(&input, token.as_deref(), &cli.format).await?;
        }
        Commands::ExtractId { input } => {
            commands::extract_id(&input, &cli.format)?;
        }
        Commands::Css => {
            commands::css(&cli.format);
        }
        Commands::Embed { source, autoplay, muted, no_controls, aspect_ratio, poster, module } => {
            let request = commands::EmbedRequest {
                source,
                autoplay,
                muted,
                controls: !no_controls,
                aspect_ratio,
                poster,
                module,
            };
            commands::embed(&request, &cli.format)?;
        }
    }

    Ok(())
}
