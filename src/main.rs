mod commands;
mod gateway;

use ayesha_channels::console::ConsoleChannel;
use ayesha_core::{
    config::{self, Config},
    message::{IncomingMessage, OutboundAction},
    traits::{Channel, ImageGenerator, Provider},
};
use ayesha_memory::{JsonFileBacking, Store};
use ayesha_providers::{DiffusionProvider, OpenAiProvider};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Parser)]
#[command(
    name = "ayesha",
    version,
    about = "Ayesha: a companion chat bot that remembers you"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "AYESHA_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on every enabled channel.
    Start,
    /// Show configuration, backend availability, and stored state.
    Status,
    /// Run one message through the engine and print the resulting actions.
    Ask {
        /// Guild the message comes from. Omit for a direct message.
        #[arg(long)]
        guild: Option<u64>,
        /// Channel the message is posted in.
        #[arg(long, default_value_t = 1)]
        channel: u64,
        /// Author user id.
        #[arg(long, default_value_t = 42)]
        author: u64,
        /// Treat the author as a guild administrator.
        #[arg(long)]
        admin: bool,
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = load_config(&cli.config, std::io::stderr)?;
    cfg.resolve_secrets();

    let _log_guard = init_logging(&cfg)?;

    match cli.command {
        Commands::Start => {
            let provider = build_provider(&cfg);
            if !provider.is_available().await {
                tracing::warn!(
                    "provider '{}' did not answer a health check; continuing anyway",
                    provider.name()
                );
            }

            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
            if let Some(ref console) = cfg.channel.console {
                if console.enabled {
                    channels.insert(
                        "console".to_string(),
                        Arc::new(ConsoleChannel::new(console.clone())),
                    );
                }
            }
            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            let gw = Arc::new(build_gateway(&cfg, provider, channels));
            println!("Ayesha: starting...");
            gw.run().await?;
        }
        Commands::Status => {
            println!("Ayesha status\n");
            println!("Config: {}", cli.config);
            println!("Data dir: {}", cfg.ayesha.data_path().display());
            println!("Persona: {}", cfg.persona.name);
            println!("Fact policy: {:?}", cfg.facts.policy);
            println!();

            let provider = build_provider(&cfg);
            println!(
                "  completion ({}): {}",
                cfg.provider.model,
                if provider.is_available().await {
                    "available"
                } else {
                    "unreachable"
                }
            );
            println!(
                "  images: {}",
                if cfg.image.enabled {
                    cfg.image.model.as_str()
                } else {
                    "disabled"
                }
            );
            match cfg.channel.console {
                Some(ref c) if c.enabled => println!("  console: enabled"),
                Some(_) => println!("  console: disabled"),
                None => println!("  console: not configured"),
            }
            println!();

            let store = open_store(&cfg);
            println!("Bound guilds: {}", store.binding_count());
            println!("Known users: {}", store.user_count());
        }
        Commands::Ask {
            guild,
            channel,
            author,
            admin,
            message,
        } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: ayesha ask <message>");
            }

            let provider = build_provider(&cfg);
            let gw = build_gateway(&cfg, provider, HashMap::new());

            let mut incoming =
                IncomingMessage::new("cli", guild, channel, author, &message.join(" "));
            incoming.author_name = Some("cli".to_string());
            incoming.is_admin = admin;

            let actions = gw.handle_message(&incoming).await;
            if actions.is_empty() {
                println!("(no response)");
            }
            for action in actions {
                println!("{}", render_action(&action));
            }
        }
    }

    Ok(())
}

/// Load the config under a temporary subscriber writing to `writer`, so
/// notices from loading are not lost before [`init_logging`] runs.
fn load_config<W>(path: &str, writer: W) -> anyhow::Result<Config>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_writer(writer)
        .finish();
    Ok(tracing::subscriber::with_default(bootstrap, || {
        config::load(path)
    })?)
}

/// Log to stderr and to `{data_dir}/logs/ayesha.log`. `RUST_LOG` overrides
/// the configured level. The returned guard flushes the file writer on drop.
fn init_logging(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    let logs = cfg.ayesha.logs_path();
    std::fs::create_dir_all(&logs)?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&logs, "ayesha.log"));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.ayesha.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

fn open_store(cfg: &Config) -> Store {
    Store::open(Arc::new(JsonFileBacking::new(cfg.ayesha.data_path())))
}

fn build_provider(cfg: &Config) -> Arc<dyn Provider> {
    Arc::new(OpenAiProvider::from_config(&cfg.provider))
}

fn build_images(cfg: &Config) -> Option<Arc<dyn ImageGenerator>> {
    if !cfg.image.enabled {
        return None;
    }
    Some(Arc::new(DiffusionProvider::from_config(
        &cfg.image,
        cfg.ayesha.output_path(),
    )))
}

fn build_gateway(
    cfg: &Config,
    provider: Arc<dyn Provider>,
    channels: HashMap<String, Arc<dyn Channel>>,
) -> gateway::Gateway {
    gateway::Gateway::new(
        provider,
        build_images(cfg),
        channels,
        open_store(cfg),
        cfg.persona.clone(),
        cfg.facts.clone(),
        cfg.image.clone(),
    )
}

fn render_action(action: &OutboundAction) -> String {
    match action {
        OutboundAction::Reply { text } => format!("↳ {text}"),
        OutboundAction::Send { text } => text.clone(),
        OutboundAction::SendFile { path } => format!("[file] {}", path.display()),
    }
}
