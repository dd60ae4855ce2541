use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::path::PathBuf;

use squad_report::analysis::summary::{outcome_breakdown, summarize, venue_breakdown};
use squad_report::analysis::table::{build_table_with_progress, MIN_MATCHWEEK};
use squad_report::api::client::DocumentStoreClient;
use squad_report::api::store::{CompetitionFilter, JsonFileStore, MatchStore};
use squad_report::cache::{CachedStore, ResponseCache};
use squad_report::config::Config;
use squad_report::display::output::{
    display_error, display_info, display_json, display_outcome_breakdown, display_report,
    display_success, display_summary, display_teams, display_unsupported, display_venue_breakdown,
};
use squad_report::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "Squad Report")]
#[command(about = "How much do opponents lose their average performance against a squad?", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the relative performance report for a squad
    Report {
        /// Squad name as stored (e.g. "Arsenal")
        team: String,

        /// Competition code to leave out; repeat for several (default: INT, INT-2)
        #[arg(short, long = "exclude")]
        exclude: Vec<String>,

        /// Read matches from a JSON export instead of the store
        #[arg(long)]
        data: Option<PathBuf>,

        /// Ignore cached store responses
        #[arg(long)]
        refresh: bool,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the squads available in the store
    Teams {
        /// Read matches from a JSON export instead of the store
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&e.to_string());
        if is_unsupported_selection(&e) {
            display_unsupported();
        }
        std::process::exit(1);
    }
}

fn is_unsupported_selection(error: &AppError) -> bool {
    matches!(
        error,
        AppError::InsufficientHistory { .. }
            | AppError::DivisionByZero
            | AppError::MatchweekParse(_)
            | AppError::MissingStatistic { .. }
            | AppError::NoMatches(_)
    )
}

fn run(args: Args) -> Result<(), AppError> {
    let config = Config::from_env()?;

    match args.command {
        Command::Report {
            team,
            exclude,
            data,
            refresh,
            json,
        } => {
            let excluded = if exclude.is_empty() {
                config.excluded.clone()
            } else {
                CompetitionFilter::new(exclude)
            };

            match data {
                Some(path) => {
                    let store = JsonFileStore::open(&path)?;
                    report(&store, &team, &excluded, json)
                }
                None => {
                    let client = DocumentStoreClient::new(&config)?;
                    let cache = ResponseCache::load(config.cache_ttl_mins).unwrap_or_else(|e| {
                        log::warn!("{}; starting with an empty cache", e);
                        ResponseCache::new(config.cache_ttl_mins)
                    });
                    let store = CachedStore::new(client, cache);
                    if refresh {
                        display_info("Refreshing data from the store (--refresh)...");
                        store.bust();
                    }

                    let outcome = report(&store, &team, &excluded, json);

                    if let Err(e) = store.save() {
                        log::warn!("{}", e);
                    }
                    outcome
                }
            }
        }
        Command::Teams { data } => {
            let teams = match data {
                Some(path) => JsonFileStore::open(&path)?.team_names()?,
                None => DocumentStoreClient::new(&config)?.team_names()?,
            };
            display_teams(&teams);
            Ok(())
        }
    }
}

fn report<S: MatchStore>(
    store: &S,
    team: &str,
    excluded: &CompetitionFilter,
    json: bool,
) -> Result<(), AppError> {
    if !json {
        display_info(&format!(
            "Fetching matches for {} (excluding {})",
            team,
            excluded.cache_key()
        ));
    }

    let matches = store.fetch_matches(excluded, team)?;
    if matches.is_empty() {
        return Err(AppError::NoMatches(team.to_string()));
    }

    let pb = if json {
        ProgressBar::hidden()
    } else {
        display_success(&format!("Found {} matches", matches.len()));
        ProgressBar::new(matches.len() as u64)
    };
    pb.set_message("Computing opponent baselines");

    let rows = build_table_with_progress(store, &matches, team, excluded, &pb)?;
    pb.finish_with_message("✓ Baselines computed");

    if rows.is_empty() {
        return Err(AppError::NoMatches(format!(
            "{} after matchweek {}",
            team, MIN_MATCHWEEK
        )));
    }

    if json {
        return display_json(&rows);
    }

    display_report(team, &rows);
    if let Some(summary) = summarize(&rows) {
        display_summary(&summary);
    }
    display_venue_breakdown(&venue_breakdown(&rows));
    display_outcome_breakdown(&outcome_breakdown(&rows));

    Ok(())
}
