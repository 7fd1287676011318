use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing::{instrument, level_filters::LevelFilter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;

#[derive(Parser)]
#[command(name = "fswarehouse", about = "Store secrets on the local filesystem", version)]
struct Cli {
    #[command(flatten)]
    warehouse: cmd::WarehouseOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Subcommand)]
enum Command {
    /// Store a secret, reading it from a file or stdin
    Store(cmd::store::Options),

    /// Retrieve a secret, writing it to a file or stdout
    Retrieve(cmd::retrieve::Options),

    /// List the IDs of all stored secrets
    Ids,
}

#[instrument]
fn main() -> Result<()> {
    let cli = Cli::parse();
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(
            tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_lines(true)
                .with_indent_amount(2)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_verbose_exit(false)
                .with_verbose_entry(false)
                .with_deferred_spans(true)
                .with_bracketed_fields(true)
                .with_span_retrace(true)
                .with_targets(false),
        )
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_env_var("FSWAREHOUSE_LOG")
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let warehouse = cli.warehouse.open()?;
    match cli.command {
        Command::Store(opts) => cmd::store::exec(&warehouse, opts),
        Command::Retrieve(opts) => cmd::retrieve::exec(&warehouse, opts),
        Command::Ids => cmd::ids::exec(&warehouse),
    }
}
