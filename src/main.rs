use std::{
    io::{self, Write},
    process,
    sync::Arc,
};

use futures::stream::TryStreamExt;
use roster::{
    application::{
        error::AppError,
        pagination::Page,
        repos::{FollowPrefs, PlayerSource},
        store::{PlayerStore, ToggleOutcome},
    },
    cache::StoreConfig,
    config,
    domain::entities::{League, Player},
    infra::{
        prefs::JsonFilePrefs,
        remote::{FilePlayerSource, HttpPlayerSource},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Players(config::PlayersArgs::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let store = build_store(&settings).await?;

    match command {
        config::Command::Players(args) => run_players(&store, args).await,
        config::Command::Followed => run_followed(&store).await,
        config::Command::Toggle(args) => run_toggle(&store, args).await,
        config::Command::Leagues => run_leagues(&store).await,
    }
}

async fn build_store(settings: &config::Settings) -> Result<PlayerStore, AppError> {
    let source: Arc<dyn PlayerSource> = match &settings.source {
        config::SourceSettings::Http { base_url, timeout } => {
            let source = HttpPlayerSource::new(base_url, *timeout)?;
            info!(url = %source.list_url(), "Using HTTP roster source");
            Arc::new(source)
        }
        config::SourceSettings::File { path } => {
            info!(path = %path.display(), "Using file roster source");
            Arc::new(FilePlayerSource::new(path.clone()))
        }
    };

    let prefs: Arc<dyn FollowPrefs> = Arc::new(JsonFilePrefs::new(
        settings.storage.prefs_path.clone(),
    ));

    let store = PlayerStore::open(source, prefs, StoreConfig::from(&settings.paging)).await?;
    Ok(store)
}

async fn run_players(store: &PlayerStore, args: config::PlayersArgs) -> Result<(), AppError> {
    let session = store.paged_view(args.sort);

    if args.all {
        let pages = session.pages();
        futures::pin_mut!(pages);
        while let Some(page) = pages.try_next().await? {
            print_page(&page)?;
        }
        return Ok(());
    }

    let page = session.load(args.page).await?;
    print_page(&page)
}

async fn run_followed(store: &PlayerStore) -> Result<(), AppError> {
    let followed = store.followed().await?;
    let mut out = io::stdout().lock();
    if followed.is_empty() {
        writeln!(out, "no followed players").map_err(write_error)?;
    }
    for player in &followed {
        write_player(&mut out, player)?;
    }
    Ok(())
}

async fn run_toggle(store: &PlayerStore, args: config::ToggleArgs) -> Result<(), AppError> {
    match store.toggle_follow(&args.id).await? {
        ToggleOutcome::Unknown => Err(AppError::validation(format!(
            "no player with id `{}`",
            args.id
        ))),
        outcome => {
            writeln!(io::stdout(), "{} {}", outcome.as_str(), args.id).map_err(write_error)?;
            Ok(())
        }
    }
}

async fn run_leagues(store: &PlayerStore) -> Result<(), AppError> {
    let leagues = store.leagues().await?;
    let mut out = io::stdout().lock();
    for league in &leagues {
        write_league(&mut out, league)?;
    }
    Ok(())
}

fn print_page(page: &Page<Player>) -> Result<(), AppError> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "-- page {} ({} players{})",
        page.page_index,
        page.items.len(),
        if page.has_next { ", more" } else { "" }
    )
    .map_err(write_error)?;
    for player in &page.items {
        write_player(&mut out, player)?;
    }
    Ok(())
}

fn write_player(out: &mut impl Write, player: &Player) -> Result<(), AppError> {
    writeln!(
        out,
        "{} {:<28} {:<24} rank {:>2} goals {:>3}  {}",
        if player.followed { "*" } else { " " },
        player.name,
        player.team.name,
        player.team.rank,
        player.total_goals,
        player.id
    )
    .map_err(write_error)
}

fn write_league(out: &mut impl Write, league: &League) -> Result<(), AppError> {
    writeln!(
        out,
        "{:<24} {:<16} rank {:>2} matches {:>4}  {}",
        league.name, league.country, league.rank, league.total_matches, league.id
    )
    .map_err(write_error)
}

fn write_error(err: io::Error) -> AppError {
    AppError::unexpected(format!("failed to write output: {err}"))
}
