//! CLI entrypoint for quote-ledger
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use ledger_application::{
    CreateQuoteInput, CreateQuoteUseCase, DeleteQuoteUseCase, ListQuotesUseCase, NoVoteEventLogger,
    VoteEventLogger, VoteLedger,
};
use ledger_domain::{ListQuery, QuoteId, UserId};
use ledger_infrastructure::{ConfigLoader, FileConfig, InMemoryQuoteStore, JsonlVoteLogger, SnapshotFile};
use ledger_presentation::{
    Cli, Command, ConsoleFormatter, JsonFormatter, OutputFormat, OutputFormatter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        print_config_sources();
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("{}", e))?
    };
    let warnings = config.check()?;

    let _log_guard = init_logging(cli.verbose, &config);
    info!("Starting quote-ledger");
    for issue in &warnings {
        warn!("{}", issue.message);
        eprintln!("{} {}", "warning:".yellow().bold(), issue.message);
    }

    if !config.output.use_color(cli.no_color) {
        colored::control::set_override(false);
    }
    let format = OutputFormat::from(
        config
            .output
            .resolve_format(cli.output.map(ledger_domain::OutputFormat::from)),
    );
    let formatter: Box<dyn OutputFormatter> = match format {
        OutputFormat::Table => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    };

    let Some(command) = cli.command.clone() else {
        bail!("No command given. Run with --help for usage.");
    };

    let user = cli.user.as_deref().map(UserId::new).transpose()?;
    if command.is_mutation() && user.is_none() {
        bail!("This command needs an acting user. Pass --user <USER_ID>.");
    }

    // === Dependency Injection ===
    let store_path = resolve_store_path(&cli, &config)?;
    info!("Using store {}", store_path.display());
    let store = Arc::new(InMemoryQuoteStore::open(SnapshotFile::new(&store_path))?);

    let event_logger: Arc<dyn VoteEventLogger> = match config
        .logging
        .vote_log
        .as_ref()
        .and_then(JsonlVoteLogger::new)
    {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoVoteEventLogger),
    };

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let ledger = VoteLedger::new(store.clone())
        .with_params(config.ledger.to_params())
        .with_event_logger(event_logger.clone())
        .with_cancellation(cancellation);
    let reads = ListQuotesUseCase::new(store.clone());

    let output = match command {
        Command::Add {
            text,
            author,
            tags,
            avatar_url,
        } => {
            let mut input = CreateQuoteInput::new(acting(&user)?.clone(), text)
                .with_author(author)
                .with_tags(tags);
            if let Some(url) = avatar_url {
                input = input.with_avatar_url(url);
            }
            let view = CreateQuoteUseCase::new(store.clone())
                .with_event_logger(event_logger.clone())
                .execute(input)
                .await?;
            formatter.format_detail(&view)
        }
        Command::Vote { quote_id } => {
            let outcome = ledger
                .cast_vote(acting(&user)?, &parse_id(&quote_id)?)
                .await?;
            formatter.format_outcome(&outcome)
        }
        Command::Unvote { quote_id } => {
            let outcome = ledger
                .withdraw_vote(acting(&user)?, &parse_id(&quote_id)?)
                .await?;
            formatter.format_outcome(&outcome)
        }
        Command::List { sort, search } => {
            let mut query = ListQuery::new(sort);
            if let Some(viewer) = &user {
                query = query.with_viewer(viewer.clone());
            }
            if let Some(search) = search {
                query = query.with_search(search);
            }
            formatter.format_list(&reads.execute(&query).await?)
        }
        Command::Show { quote_ids } => {
            let ids = quote_ids
                .iter()
                .map(|id| parse_id(id))
                .collect::<Result<Vec<_>>>()?;
            let views = reads.get_many(user.as_ref(), &ids).await?;
            match views.as_slice() {
                [view] => formatter.format_detail(view),
                _ => formatter.format_list(&views),
            }
        }
        Command::Mine => {
            let Some(user) = &user else {
                bail!("This command needs a user. Pass --user <USER_ID>.");
            };
            formatter.format_list(&reads.list_mine(user).await?)
        }
        Command::Delete { quote_id } => {
            let id = parse_id(&quote_id)?;
            DeleteQuoteUseCase::new(store.clone())
                .with_event_logger(event_logger.clone())
                .execute(acting(&user)?, &id)
                .await?;
            formatter.format_deleted(&id)
        }
    };

    print!("{}", output);
    if format == OutputFormat::Json {
        println!();
    }

    Ok(())
}

fn acting(user: &Option<UserId>) -> Result<&UserId> {
    user.as_ref()
        .ok_or_else(|| anyhow!("This command needs an acting user. Pass --user <USER_ID>."))
}

fn parse_id(raw: &str) -> Result<QuoteId> {
    raw.parse::<QuoteId>()
        .with_context(|| format!("invalid quote id '{}'", raw))
}

/// Pick the snapshot file: `--store`, then `[store] path`, then the XDG data dir.
fn resolve_store_path(cli: &Cli, config: &FileConfig) -> Result<PathBuf> {
    cli.store
        .clone()
        .or_else(|| config.store.path.clone())
        .or_else(ConfigLoader::default_store_path)
        .ok_or_else(|| anyhow!("No data directory found. Pass --store <PATH>."))
}

/// Initialize tracing from `-v` count, honoring `RUST_LOG` when set.
///
/// With `[logging] file` configured, output goes to that file through a
/// non-blocking writer; the returned guard must live until exit.
fn init_logging(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let target = config.logging.file.as_ref().and_then(|path| {
        let file_name = path.file_name()?.to_owned();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir).ok()?;
        Some(tracing_appender::rolling::never(dir, file_name))
    });

    match target {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

fn print_config_sources() {
    for line in ConfigLoader::config_sources() {
        println!("{}", line);
    }
    match ConfigLoader::default_store_path() {
        Some(path) => println!("Default store: {}", path.display()),
        None => println!("Default store: (no data directory)"),
    }
}
