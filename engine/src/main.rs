// Engine main entry point
use anyhow::Context;
use clap::Parser;
use pdv_engine::analytics::{FortnightComparison, MonthlyAmount, TerminalSummary};
use pdv_engine::config::EngineSettings;
use pdv_engine::data::PeriodId;
use pdv_engine::services::{DashboardService, PeriodStatus};
use serde::Serialize;
use shared::models::{DailyAmount, RankDirection, TerminalAmount, TrackedPaymentType};
use shared::utils::brazilian_format::format_currency;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pdv-engine", version, about = "Aggregates PDV sales exports into dashboard figures")]
struct Cli {
    /// Settings file (JSON); the embedded defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the monthly CSV exports
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Use synthetic figures for every period instead of reading exports
    #[arg(long)]
    demo: bool,

    /// Period label for the terminal detail, e.g. "Março 2025"
    #[arg(long)]
    period: Option<String>,

    /// Terminal id for the daily series and summary
    #[arg(long)]
    terminal: Option<String>,

    /// Payment type to rank terminals by
    #[arg(long = "payment-type", default_value = "LISTA")]
    payment_type: String,

    /// Only rank terminals of this category (the export's "TIPO DO TERMINAL")
    #[arg(long)]
    category: Option<String>,

    /// Rank the lowest terminals instead of the highest
    #[arg(long)]
    bottom: bool,

    /// Number of ranked terminals (defaults to the configured ranking_limit)
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct PeriodReport {
    period: PeriodId,
    is_synthetic: bool,
    grand_total: f64,
    totals_by_payment_type: BTreeMap<String, f64>,
    categories: BTreeSet<String>,
    ranking: Vec<TerminalAmount>,
}

#[derive(Serialize)]
struct TerminalReport {
    period: PeriodId,
    terminal: String,
    summary: TerminalSummary,
    daily_totals: Option<Vec<DailyAmount>>,
    daily_totals_by_serial: Option<BTreeMap<String, Vec<DailyAmount>>>,
    fortnight: Option<FortnightComparison>,
}

#[derive(Serialize)]
struct Report<'a> {
    notice: Option<&'static str>,
    statuses: &'a [PeriodStatus],
    payment_type: String,
    category: Option<String>,
    direction: RankDirection,
    periods: Vec<PeriodReport>,
    monthly_evolution: BTreeMap<TrackedPaymentType, Vec<MonthlyAmount>>,
    terminal: Option<TerminalReport>,
}

fn load_settings(cli: &Cli) -> anyhow::Result<EngineSettings> {
    let mut settings = match &cli.config {
        Some(path) => EngineSettings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => EngineSettings::load_default()?,
    };
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    Ok(settings)
}

// --period and --terminal only make sense together.
fn terminal_target(period: Option<&str>, terminal: Option<&str>) -> anyhow::Result<Option<(PeriodId, String)>> {
    match (period, terminal) {
        (Some(period), Some(terminal)) => Ok(Some((PeriodId::from(period), terminal.to_string()))),
        (None, Some(_)) => anyhow::bail!("--terminal requires --period"),
        (Some(_), None) => anyhow::bail!("--period requires --terminal"),
        (None, None) => Ok(None),
    }
}

fn terminal_report(service: &DashboardService, period: PeriodId, terminal: String) -> TerminalReport {
    // Synthetic periods have no rows to build series from.
    let daily_totals = service
        .daily_totals(&period, &terminal)
        .map_err(|e| tracing::warn!(period = %period, error = %e, "No daily series"))
        .ok();
    let daily_totals_by_serial = service.daily_totals_by_serial(&period, &terminal).ok();
    let fortnight = service.fortnight_comparison(&period, None).ok();

    TerminalReport {
        summary: service.terminal_summary(&period, &terminal),
        period,
        terminal,
        daily_totals,
        daily_totals_by_serial,
        fortnight,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt::init();

    info!("Starting PDV engine...");

    let target = terminal_target(cli.period.as_deref(), cli.terminal.as_deref())?;

    let settings = load_settings(&cli)?;
    let mut service = DashboardService::new(settings)?;
    info!(
        data_dir = %service.settings().data_dir.display(),
        excluded = ?service.filter().excluded().collect::<Vec<_>>(),
        "Settings loaded"
    );

    if cli.demo {
        service.synthesize_all()?;
    } else {
        service.load_all_data().await?;
    }
    info!(periods = service.registry().loaded_count(), "Periods ready");
    if let Some(notice) = service.notice() {
        tracing::warn!("{}", notice.message());
    }

    let direction = if cli.bottom { RankDirection::Bottom } else { RankDirection::Top };
    let periods: Vec<PeriodReport> = service
        .registry()
        .iter()
        .filter_map(|(period, aggregate)| Some((period, aggregate?)))
        .map(|(period, aggregate)| {
            info!(
                period = %period,
                total = %format_currency(aggregate.grand_total()),
                synthetic = aggregate.is_synthetic(),
                "Period aggregated"
            );
            PeriodReport {
                period: period.clone(),
                is_synthetic: aggregate.is_synthetic(),
                grand_total: aggregate.grand_total(),
                totals_by_payment_type: aggregate.totals_by_payment_type().clone(),
                categories: aggregate.categories().into_iter().map(String::from).collect(),
                ranking: service.rank_in_category(period, &cli.payment_type, cli.category.as_deref(), direction, cli.limit),
            }
        })
        .collect();

    let monthly_evolution = TrackedPaymentType::ALL
        .into_iter()
        .map(|kind| (kind, service.monthly_evolution(kind)))
        .collect();

    let terminal = target.map(|(period, terminal)| terminal_report(&service, period, terminal));

    let report = Report {
        notice: service.notice().map(|n| n.message()),
        statuses: service.statuses(),
        payment_type: cli.payment_type.trim().to_uppercase(),
        category: cli.category.clone(),
        direction,
        periods,
        monthly_evolution,
        terminal,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_and_terminal_go_together() {
        let target = terminal_target(Some("Março 2025"), Some("001")).unwrap();
        assert_eq!(target, Some((PeriodId::new("Março 2025"), "001".to_string())));
        assert_eq!(terminal_target(None, None).unwrap(), None);

        let err = terminal_target(Some("Março 2025"), None).unwrap_err();
        assert_eq!(err.to_string(), "--period requires --terminal");
        let err = terminal_target(None, Some("001")).unwrap_err();
        assert_eq!(err.to_string(), "--terminal requires --period");
    }

    #[test]
    fn test_cli_parses_category_filter() {
        let cli = Cli::try_parse_from(["pdv-engine", "--demo", "--category", "METRÔ", "--bottom", "--limit", "5"]).unwrap();
        assert!(cli.demo && cli.bottom);
        assert_eq!(cli.category.as_deref(), Some("METRÔ"));
        assert_eq!(cli.limit, Some(5));
        assert_eq!(cli.payment_type, "LISTA");
    }
}
