use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::{ClientInitializer, InMemoryPage};
use crate::config::Config;
use crate::domain::track::TrackReference;
use crate::http::server::HttpServer;
use crate::oembed::{fetcher::HttpFetcher, provider::AsyncHttpProvider};
use crate::render::client::{ClientRenderer, filled_placeholder};
use crate::render::server::{SETTINGS_SUMMARY, ServerRenderer};

#[derive(Parser)]
#[command(name = "soundfield")]
#[command(version)]
#[command(about = "Renders configured SoundCloud players from oEmbed")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "soundfield.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and print the player markup for each URL
    Render {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Print placeholders and the settings payload for the page script
    Client {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Run the page initializer headless and print the filled placeholders
    Hydrate {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Run http server rendering players
    Serve,
    /// Show effective player settings
    Settings,
}

fn tracks(urls: &[String]) -> Vec<TrackReference> {
    urls.iter().map(|u| TrackReference::new(u.as_str())).collect()
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = Config::load_or_default(&cli.config)?;

    match &cli.command {
        Commands::Render { urls } => {
            let fetcher = HttpFetcher::new(&cfg.oembed).context("Failed to build HTTP client")?;
            let renderer = ServerRenderer::new(fetcher, cfg.player);

            for markup in renderer.render(&tracks(urls)) {
                println!("{markup}");
            }
        }

        Commands::Client { urls } => {
            let render = ClientRenderer::new(cfg.client).render(&tracks(urls));

            for placeholder in &render.placeholders {
                println!("{placeholder}");
            }
            println!("{}", render.settings_script()?);
        }

        Commands::Hydrate { urls } => {
            let render = ClientRenderer::new(cfg.client).render(&tracks(urls));
            let page = InMemoryPage::new(render.payload.iter().map(|s| s.id.as_str()));

            let provider =
                AsyncHttpProvider::new(&cfg.oembed).context("Failed to build HTTP client")?;
            let initializer = ClientInitializer::new(provider);

            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            let inserted = runtime.block_on(initializer.attach(&page, &render.payload));
            log::info!("{inserted} of {} player(s) inserted", render.payload.len());

            for settings in &render.payload {
                let content = page.content(&settings.id).unwrap_or_default();
                println!("{}", filled_placeholder(&settings.id, &content));
            }
        }

        Commands::Serve => {
            println!("Starting HTTP server...");

            let fetcher = HttpFetcher::new(&cfg.oembed).context("Failed to build HTTP client")?;
            let http_server = HttpServer::new(
                ServerRenderer::new(fetcher, cfg.player),
                ClientRenderer::new(cfg.client),
                cfg.http,
            );

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::Settings => {
            println!("{SETTINGS_SUMMARY}");
            println!("oEmbed endpoint: {}", cfg.oembed.endpoint);
            println!("[player]\n{}", toml::to_string(&cfg.player)?);
            println!("[client]\n{}", toml::to_string(&cfg.client)?);
        }
    }

    Ok(())
}
