use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use squad_report::analysis::table::{build_table, MatchRow};
use squad_report::api::models::{MatchRecord, Outcome, Venue};
use squad_report::api::store::{CompetitionFilter, MatchStore, MemoryStore};
use squad_report::error::AppError;

const ACME: &str = "Acme FC";
const BETA: &str = "Beta United";

/// Values are ball possession, pass opp half %, xG open play per 100 passes
/// and touches in the opposition box per 100 passes.
fn record(round: Value, home: &str, away: &str, result: &str, home_stats: [f64; 4], away_stats: [f64; 4]) -> MatchRecord {
    let pair = |i: usize| json!({ "home": home_stats[i], "away": away_stats[i] });
    serde_json::from_value(json!({
        "general": { "round": round, "league": "Premier League", "country": "ENG" },
        "teams": { "home": { "name": home }, "away": { "name": away } },
        "stats": {
            "ball_possession": pair(0),
            "passes_opp_half_%": pair(1),
            "xg_op_for_100_passes": pair(2),
            "touch_opp_box_100_passes": pair(3)
        },
        "result": result
    }))
    .expect("fixture should deserialize")
}

fn acme_matches(store: &MemoryStore) -> Vec<MatchRecord> {
    store
        .fetch_matches(&CompetitionFilter::default(), ACME)
        .expect("memory store never fails")
}

/// Beta United plays weeks 3 and 6, then visits Acme FC in week 8.
fn scenario_records() -> Vec<MatchRecord> {
    vec![
        record(json!("Round 8"), ACME, BETA, "home", [46.0, 30.0, 2.0, 8.0], [54.0, 20.0, 1.0, 4.0]),
        record(json!("Round 3"), BETA, "Gamma", "draw", [40.0, 20.0, 1.0, 4.0], [60.0, 25.0, 1.5, 5.0]),
        record(json!(6), "Delta", BETA, "away", [50.0, 22.0, 1.2, 6.0], [50.0, 20.0, 1.0, 4.0]),
    ]
}

fn scenario_store() -> MemoryStore {
    MemoryStore::new(scenario_records())
}

#[test]
fn opponent_deviation_against_its_own_baseline() {
    let store = scenario_store();
    let rows = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.matchweek, 8);
    assert_eq!(row.venue, Venue::Home);
    assert_eq!(row.result, Outcome::Win);
    assert_eq!(row.opponent, BETA);

    // baseline possession (40 + 50) / 2 = 45, observed 54
    assert_eq!(row.ball_possession, 20.0);
    assert_eq!(row.pass_opp_half, 0.0);
    assert_eq!(row.xg_open_play, 0.0);
    assert_eq!(row.touch_opp_box, 0.0);

    assert_eq!(row.overall_deviation, 5.0);
    assert_eq!(row.dispersion, 10.0);
    assert!((row.weighted_deviation - 2.4).abs() < 1e-9);
}

#[test]
fn early_weeks_dropped_and_rows_ordered() {
    let store = MemoryStore::new(vec![
        record(json!(9), "Gamma", ACME, "away", [50.0, 30.0, 1.0, 5.0], [50.0, 30.0, 1.0, 5.0]),
        record(json!("Round 7"), ACME, BETA, "draw", [50.0, 30.0, 1.0, 5.0], [45.0, 18.0, 0.8, 3.0]),
        record(json!("Round 5"), ACME, "Delta", "home", [50.0, 30.0, 1.0, 5.0], [50.0, 30.0, 1.0, 5.0]),
        record(json!(2), ACME, "Gamma", "home", [50.0, 30.0, 1.0, 5.0], [40.0, 25.0, 2.0, 4.0]),
        record(json!("Round 3"), BETA, "Gamma", "draw", [40.0, 20.0, 1.0, 4.0], [60.0, 25.0, 1.5, 5.0]),
        record(json!(6), "Delta", BETA, "away", [50.0, 22.0, 1.2, 6.0], [50.0, 20.0, 1.0, 4.0]),
    ]);

    let rows = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap();

    let weeks: Vec<i64> = rows.iter().map(|r| r.matchweek).collect();
    assert_eq!(weeks, vec![7, 9]);
    assert!(rows.iter().all(|r| r.matchweek > 5));

    assert_eq!(rows[0].result, Outcome::Draw);
    assert_eq!(rows[1].venue, Venue::Away);
    assert_eq!(rows[1].opponent, "Gamma");
    assert_eq!(rows[1].result, Outcome::Win);
}

#[test]
fn away_loss_reads_home_slot() {
    let store = MemoryStore::new(vec![
        record(json!(10), BETA, ACME, "home", [60.0, 24.0, 1.1, 4.4], [40.0, 10.0, 0.1, 1.0]),
        record(json!(4), BETA, "Gamma", "home", [50.0, 20.0, 1.0, 4.0], [50.0, 20.0, 1.0, 4.0]),
    ]);

    let rows = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].venue, Venue::Away);
    assert_eq!(rows[0].result, Outcome::Loss);
    assert_eq!(rows[0].deviations(), [20.0, 20.0, 10.0, 10.0]);
}

#[test]
fn opponent_without_prior_matches_fails_whole_table() {
    let mut records = scenario_records();
    records.push(record(json!(7), ACME, "Newcomers", "home", [50.0, 30.0, 1.0, 5.0], [50.0, 30.0, 1.0, 5.0]));
    let store = MemoryStore::new(records);

    let err = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap_err();
    match err {
        AppError::InsufficientHistory { team, cutoff } => {
            assert_eq!(team, "Newcomers");
            assert_eq!(cutoff, 7);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn excluded_competitions_do_not_count_towards_baseline() {
    let mut cup = record(json!(2), BETA, "Gamma", "home", [90.0, 90.0, 9.0, 9.0], [10.0, 10.0, 1.0, 1.0]);
    cup.general.country = Some("INT".to_string());

    let mut records = scenario_records();
    records.push(cup);
    let store = MemoryStore::new(records);

    let rows = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap();
    assert_eq!(rows[0].ball_possession, 20.0);
}

#[test]
fn zero_baseline_is_division_by_zero() {
    let store = MemoryStore::new(vec![
        record(json!(8), ACME, BETA, "home", [50.0, 30.0, 1.0, 5.0], [50.0, 30.0, 1.0, 5.0]),
        record(json!(3), BETA, "Gamma", "home", [50.0, 30.0, 0.0, 5.0], [50.0, 30.0, 1.0, 5.0]),
    ]);

    let err = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap_err();
    assert!(matches!(err, AppError::DivisionByZero));
}

#[test]
fn malformed_round_fails() {
    let store = MemoryStore::new(vec![record(json!("Final"), ACME, BETA, "home", [1.0; 4], [1.0; 4])]);

    let err = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap_err();
    assert!(matches!(err, AppError::MatchweekParse(_)));
}

#[test]
fn missing_statistic_fails() {
    let mut target = record(json!(8), ACME, BETA, "home", [1.0; 4], [1.0; 4]);
    target.stats.remove("touch_opp_box_100_passes");
    let store = MemoryStore::new(vec![target]);

    let err = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap_err();
    assert!(matches!(err, AppError::MissingStatistic { .. }));
}

#[test]
fn repeated_builds_are_identical() {
    let store = scenario_store();
    let matches = acme_matches(&store);
    let first: Vec<MatchRow> = build_table(&store, &matches, ACME, &CompetitionFilter::default()).unwrap();
    let second: Vec<MatchRow> = build_table(&store, &matches, ACME, &CompetitionFilter::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn malformed_round_in_opponent_history_fails() {
    let store = MemoryStore::new(vec![
        record(json!("Round 8"), ACME, BETA, "home", [46.0, 30.0, 2.0, 8.0], [54.0, 20.0, 1.0, 4.0]),
        record(json!("Round 3"), BETA, "Gamma", "draw", [40.0, 20.0, 1.0, 4.0], [60.0, 25.0, 1.5, 5.0]),
        record(json!("Final"), "Delta", BETA, "away", [50.0, 22.0, 1.2, 6.0], [50.0, 20.0, 1.0, 4.0]),
    ]);

    let err = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap_err();
    match err {
        AppError::MatchweekParse(round) => assert_eq!(round, "Final"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn baseline_mean_matches_exact_average() {
    let mut records = vec![record(json!(8), ACME, BETA, "home", [50.0; 4], [50.0, 20.0, 2.11, 4.0])];
    for (week, xg) in [2.59, 0.76, 0.71, 2.75, 1.19].into_iter().enumerate() {
        records.push(record(json!(week + 1), BETA, "Gamma", "home", [50.0, 20.0, xg, 4.0], [50.0; 4]));
    }
    let store = MemoryStore::new(records);

    let rows = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap();
    assert_eq!(rows[0].deviations(), [0.0, 0.0, 31.88, 0.0]);
}

#[test]
fn negative_round_is_left_out_but_feeds_baseline() {
    let store = MemoryStore::new(vec![
        record(json!("Round -1"), ACME, BETA, "home", [50.0; 4], [50.0; 4]),
        record(json!(7), ACME, BETA, "home", [50.0; 4], [55.0, 22.0, 1.1, 4.4]),
        record(json!(-3), BETA, "Gamma", "home", [50.0, 20.0, 1.0, 4.0], [50.0; 4]),
    ]);

    let rows = build_table(&store, &acme_matches(&store), ACME, &CompetitionFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].matchweek, 7);
}
