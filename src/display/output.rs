use crate::analysis::summary::{OutcomeGroup, Summary, VenueSpread};
use crate::analysis::table::MatchRow;
use crate::api::models::Outcome;
use crate::error::AppError;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Matchweek")]
    matchweek: String,
    #[tabled(rename = "Venue")]
    venue: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Opponent")]
    opponent: String,
    #[tabled(rename = "Ball Poss Diff %")]
    ball_possession: String,
    #[tabled(rename = "Pass Opp Half Diff %")]
    pass_opp_half: String,
    #[tabled(rename = "xG Open Play 100 Passes Diff %")]
    xg_open_play: String,
    #[tabled(rename = "Touch Opp Box 100 Passes Diff %")]
    touch_opp_box: String,
    #[tabled(rename = "Overall Diff %")]
    overall: String,
    #[tabled(rename = "Weighted Avg Diff %")]
    weighted: String,
    #[tabled(rename = "Standard Dev")]
    dispersion: String,
}

#[derive(Tabled)]
struct VenueRow {
    venue: String,
    matches: String,
    min: String,
    median: String,
    max: String,
    mean: String,
}

#[derive(Tabled)]
struct OutcomeRow {
    result: String,
    venue: String,
    #[tabled(rename = "total std dev")]
    total_dispersion: String,
    #[tabled(rename = "mean weighted %")]
    mean_weighted: String,
    opponents: String,
}

// Lower is better for every deviation column.
fn deviation_cell(value: f64) -> String {
    let text = format!("{:.2}", value);
    if value <= 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn outcome_cell(result: Outcome) -> String {
    match result {
        Outcome::Win => "Win".green().to_string(),
        Outcome::Loss => "Loss".red().to_string(),
        Outcome::Draw => "Draw".yellow().to_string(),
    }
}

pub fn display_report(team: &str, rows: &[MatchRow]) {
    println!(
        "\n{}",
        format!("📋 Squad Report: {}", team).bold().cyan()
    );
    println!("{}", "How much do opponents drop from their average against this squad?".cyan());
    println!("{}\n", "=".repeat(80).cyan());

    let table_rows: Vec<ReportRow> = rows
        .iter()
        .map(|row| ReportRow {
            matchweek: row.matchweek.to_string(),
            venue: row.venue.to_string(),
            result: outcome_cell(row.result),
            opponent: row.opponent.clone(),
            ball_possession: deviation_cell(row.ball_possession),
            pass_opp_half: deviation_cell(row.pass_opp_half),
            xg_open_play: deviation_cell(row.xg_open_play),
            touch_opp_box: deviation_cell(row.touch_opp_box),
            overall: deviation_cell(row.overall_deviation),
            weighted: deviation_cell(row.weighted_deviation),
            dispersion: format!("{:.2}", row.dispersion),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);
    println!("• All metrics except Standard Dev are lower-is-better\n");
}

pub fn display_summary(summary: &Summary) {
    println!(
        "{}",
        format!("📊 Last {} Matches", summary.matches).bold().yellow()
    );
    println!("  xG Open Play for 100 Passes Diff %: {}", deviation_cell(summary.xg_open_play));
    println!("  Pass Opp Half Diff %:               {}", deviation_cell(summary.pass_opp_half));
    println!("  Weighted Avg Diff %:                {}", deviation_cell(summary.weighted_deviation));
    println!("  Standard Deviation:                 {:.2}\n", summary.dispersion);
}

pub fn display_venue_breakdown(spreads: &[VenueSpread]) {
    if spreads.is_empty() {
        return;
    }

    println!("{}", "🏟️  Weighted Avg Diff % by Venue".bold().cyan());

    let rows: Vec<VenueRow> = spreads
        .iter()
        .map(|s| VenueRow {
            venue: s.venue.to_string(),
            matches: s.matches.to_string(),
            min: format!("{:.2}", s.min),
            median: format!("{:.2}", s.median),
            max: format!("{:.2}", s.max),
            mean: deviation_cell(s.mean),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_outcome_breakdown(groups: &[OutcomeGroup]) {
    if groups.is_empty() {
        return;
    }

    println!("{}", "🧩 Results by Venue".bold().cyan());

    let rows: Vec<OutcomeRow> = groups
        .iter()
        .map(|g| OutcomeRow {
            result: outcome_cell(g.result),
            venue: g.venue.to_string(),
            total_dispersion: format!("{:.2}", g.total_dispersion),
            mean_weighted: deviation_cell(g.mean_weighted),
            opponents: g.opponents.join(", "),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_json(rows: &[MatchRow]) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(rows)
        .map_err(|e| AppError::JsonError(format!("Failed to serialize table: {}", e)))?;
    println!("{}", json);
    Ok(())
}

pub fn display_teams(teams: &[String]) {
    println!("\n{}", format!("⚽ {} squads available", teams.len()).bold().cyan());
    for team in teams {
        println!("  • {}", team);
    }
    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_unsupported() {
    eprintln!(
        "{}",
        "Selection not supported yet: the league may not have started or has fewer than 6 matchweeks."
            .yellow()
    );
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
