use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use release_resolver::config::{LOG_FILE_NAME, ResolverConfig, config_path, data_dir, log_path};
use release_resolver::release::catalogue::CatalogueQuery;
use release_resolver::release::resolver::{AppSpec, ReleaseResolver};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "release-resolver")]
#[command(version, about = "Resolve firmware updates from GitHub releases")]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    log_stderr: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ChannelArgs {
    /// Hardware revision the asset name must contain
    #[arg(long = "hw", default_value = "")]
    hardware: String,

    /// Include pre-release (alpha) releases; off by default, so only stable
    /// releases are offered unless this flag is passed
    #[arg(long)]
    prerelease: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the filtered release catalogue of a repository
    List {
        owner: String,
        app: String,
        #[arg(long)]
        arch: String,
        #[command(flatten)]
        channel: ChannelArgs,
    },
    /// Check for the next update of owner:app:arch:version
    Check {
        app_spec: AppSpec,
        #[command(flatten)]
        channel: ChannelArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_stderr, cli.log_json)?;

    let config = load_config(cli.config.as_ref())?;
    let resolver = ReleaseResolver::from_config(&config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(&resolver, cli.command))
}

async fn run(resolver: &ReleaseResolver, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List {
            owner,
            app,
            arch,
            channel,
        } => {
            let query = CatalogueQuery::new(owner, app, arch)
                .with_hardware(channel.hardware)
                .with_prerelease(channel.prerelease);
            let set = resolver.build(&query).await?;
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
        Command::Check { app_spec, channel } => {
            let query = app_spec
                .query()
                .with_hardware(channel.hardware)
                .with_prerelease(channel.prerelease);
            let result = resolver.check(&query, Some(app_spec.version.as_str())).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ResolverConfig> {
    match path {
        Some(path) => Ok(ResolverConfig::load(path)?),
        None => {
            let default_path = config_path();
            if default_path.exists() {
                Ok(ResolverConfig::load(&default_path)?)
            } else {
                Ok(ResolverConfig::default())
            }
        }
    }
}

fn init_logging(log_stderr: bool, log_json: bool) -> anyhow::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = if log_stderr {
        tracing_appender::non_blocking(std::io::stderr())
    } else {
        let dir = data_dir();
        std::fs::create_dir_all(&dir)?;
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE_NAME))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);
    if log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    if !log_stderr {
        info!("Logging to {:?}", log_path());
    }

    Ok(guard)
}
