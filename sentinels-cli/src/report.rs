use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use sentinels_setup::{Candidate, ScoreBand, SetupEngine, SetupError, SetupRequest};
use serde::Serialize;
use std::io::Write;

/// Outcome of one requested setup.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SetupResult<'a> {
    Found { trials: u32, setup: Candidate<'a> },
    Exhausted { trials: u32 },
}

impl SetupResult<'_> {
    pub const fn trials(&self) -> u32 {
        match self {
            Self::Found { trials, .. } | Self::Exhausted { trials } => *trials,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: String,
    pub seed: u64,
    pub request: &'a SetupRequest,
    pub band: ScoreBand,
    pub results: Vec<SetupResult<'a>>,
}

impl RunReport<'_> {
    pub fn found(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, SetupResult::Found { .. }))
            .count()
    }

    pub fn all_found(&self) -> bool {
        self.found() == self.results.len()
    }
}

/// Run `count` searches, each on its own stream derived from `seed`.
///
/// Exhausted searches are recorded; structural errors abort the run since
/// every later search would fail the same way.
pub fn run_setups<'a>(
    engine: &'a SetupEngine,
    request: &'a SetupRequest,
    seed: u64,
    count: u32,
) -> Result<RunReport<'a>, SetupError> {
    let mut results = Vec::with_capacity(count as usize);
    for idx in 0..count {
        let result = match engine.find_setup_seeded(request, seed, u64::from(idx)) {
            Ok(outcome) => SetupResult::Found {
                trials: outcome.trials,
                setup: outcome.setup,
            },
            Err(SetupError::SearchExhausted { trials }) => SetupResult::Exhausted { trials },
            Err(err) => return Err(err),
        };
        results.push(result);
    }
    Ok(RunReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        seed,
        request,
        band: engine.band_for(request.loss_pct),
        results,
    })
}

fn pack_list(request: &SetupRequest) -> String {
    request
        .packs
        .iter()
        .map(|pack| pack.key())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn write_console_report(out: &mut dyn Write, report: &RunReport<'_>) -> Result<()> {
    let request = report.request;
    writeln!(
        out,
        "{} {} players, {}% loss ±{}, band {}",
        "Target:".bright_cyan().bold(),
        request.player_count,
        request.loss_pct,
        request.tolerance,
        report.band
    )?;
    writeln!(out, "Packs: {}", pack_list(request))?;
    writeln!(out)?;

    for result in &report.results {
        match result {
            SetupResult::Found { trials, setup } => {
                writeln!(out, "{}", format!("Found in {trials} iterations:").green())?;
                for hero in &setup.heroes {
                    writeln!(out, "   {} [{:+}]", hero.name.bold(), hero.points)?;
                }
                writeln!(
                    out,
                    "   vs. {} [{:+}]",
                    setup.villain.name.red().bold(),
                    setup.villain.points
                )?;
                writeln!(
                    out,
                    "   in {} [{:+}]",
                    setup.environment.name.bold(),
                    setup.environment.points
                )?;
                writeln!(
                    out,
                    "   {} heroes [{:+}], difficulty {}",
                    setup.player_count(),
                    setup.player_offset,
                    setup.score.to_string().yellow()
                )?;
            }
            SetupResult::Exhausted { trials } => {
                writeln!(
                    out,
                    "{}",
                    format!("No setup found in {trials} iterations.").red()
                )?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "Seed: {}", report.seed)?;
    Ok(())
}

pub fn write_json_report(out: &mut dyn Write, report: &RunReport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_markdown_report(out: &mut dyn Write, report: &RunReport<'_>) -> Result<()> {
    let request = report.request;
    writeln!(out, "# Sentinels Setups\n")?;
    writeln!(out, "- **Generated**: {}", report.generated_at)?;
    writeln!(out, "- **Seed**: {}", report.seed)?;
    writeln!(out, "- **Players**: {}", request.player_count)?;
    writeln!(
        out,
        "- **Target loss**: {}% ±{} (band {})",
        request.loss_pct, request.tolerance, report.band
    )?;
    writeln!(out, "- **Packs**: {}", pack_list(request))?;
    writeln!(
        out,
        "- **Found**: {}/{}",
        report.found(),
        report.results.len()
    )?;
    let iterations: u64 = report.results.iter().map(|r| u64::from(r.trials())).sum();
    writeln!(out, "- **Iterations**: {iterations}\n")?;

    for (idx, result) in report.results.iter().enumerate() {
        writeln!(out, "## Setup {}\n", idx + 1)?;
        match result {
            SetupResult::Found { trials, setup } => {
                writeln!(out, "| Role | Card | Points |")?;
                writeln!(out, "|------|------|--------|")?;
                for hero in &setup.heroes {
                    writeln!(out, "| Hero | {} | {:+} |", hero.name, hero.points)?;
                }
                writeln!(
                    out,
                    "| Villain | {} | {:+} |",
                    setup.villain.name, setup.villain.points
                )?;
                writeln!(
                    out,
                    "| Environment | {} | {:+} |",
                    setup.environment.name, setup.environment.points
                )?;
                writeln!(
                    out,
                    "| {} heroes | | {:+} |\n",
                    setup.player_count(),
                    setup.player_offset
                )?;
                writeln!(
                    out,
                    "Difficulty **{}**, found in {trials} iterations.\n",
                    setup.score
                )?;
            }
            SetupResult::Exhausted { trials } => {
                writeln!(out, "No setup found in {trials} iterations.\n")?;
            }
        }
    }
    Ok(())
}
