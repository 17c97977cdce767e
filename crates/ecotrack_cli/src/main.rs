//! EcoTrack command-line entry point.
//!
//! Loads configuration, starts logging, opens the footprint store and runs
//! one subcommand. Results are printed as JSON on stdout.

mod cli;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use cli::{Args, Command};
use ecotrack_core::carbon::factors::calculate_carbon_impact;
use ecotrack_core::db::{open_db, open_db_in_memory};
use ecotrack_core::{
    calendar_month_comparison, format_carbon_value, init_logging, journey_event,
    AnalyzerRegistry, AppConfig, CarbonEventInput, CarbonEventListQuery, Category,
    FootprintService, PeriodPreset, PeriodSummary, ReceiptImage, SqliteFootprintRepository,
    TransportMode,
};
use log::info;
use serde::Serialize;
use std::path::Path;

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    config.apply_process_env();
    if let Some(db) = args.db.clone() {
        config.database.path = db;
    }

    init_logging(&config.logging).context("failed to start logging")?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        ecotrack_core::core_version()
    );

    let mut conn = if config.database.is_in_memory() {
        open_db_in_memory()
    } else {
        open_db(&config.database.path)
    }
    .with_context(|| format!("failed to open database {}", config.database.path))?;

    let mut service = FootprintService::new(SqliteFootprintRepository::new(&mut conn));
    run(args.command, &config, &mut service)
}

fn run(
    command: Command,
    config: &AppConfig,
    service: &mut FootprintService<SqliteFootprintRepository<'_>>,
) -> Result<()> {
    let today = Local::now().date_naive();

    match command {
        Command::Record {
            user,
            category,
            impact,
            amount,
            subcategory,
            quantity,
            description,
            date,
        } => {
            let impact = match impact {
                Some(impact) => impact,
                None => estimate_impact(&category, subcategory.as_deref(), amount, quantity)?,
            };
            let occurred_at = at_day(date.as_deref(), today)?;
            let mut input = CarbonEventInput::new(user, occurred_at, category, impact);
            input.amount = amount;
            input.subcategory = subcategory;
            input.description = description;
            print_json(&service.record_event(&input)?)
        }
        Command::Transport {
            user,
            mode,
            km,
            from,
            to,
            date,
        } => {
            let Some(mode) = TransportMode::parse(&mode) else {
                bail!("unknown transport mode `{mode}`");
            };
            let occurred_at = at_day(date.as_deref(), today)?;
            let input = journey_event(user, occurred_at, mode, km, &from, &to);
            print_json(&service.record_event(&input)?)
        }
        Command::Summary {
            user,
            period,
            between,
        } => {
            let summary = match between {
                Some(bounds) => {
                    let [start, end, previous_start, previous_end] = bounds.as_slice() else {
                        bail!("--between expects exactly four dates");
                    };
                    service.summarize_between(
                        &user,
                        parse_day(start)?,
                        parse_day(end)?,
                        parse_day(previous_start)?,
                        parse_day(previous_end)?,
                    )?
                }
                None => {
                    let (current, previous) = calendar_month_comparison(today);
                    service.summarize(&user, current, previous)?
                }
            };
            let window = PeriodPreset::parse_or_default(period.as_deref()).resolve(today);
            let chart = service.chart_series(&user, window)?;
            print_json(&serde_json::json!({
                "summary": summary,
                "display": summary_display(&summary),
                "chart": chart,
            }))
        }
        Command::Chart { user, period } => {
            let window = PeriodPreset::parse_or_default(period.as_deref()).resolve(today);
            print_json(&service.chart_series(&user, window)?)
        }
        Command::Events {
            user,
            category,
            since,
            limit,
            offset,
        } => {
            let mut query = CarbonEventListQuery::for_user(user);
            query.category = category.as_deref().map(parse_category).transpose()?;
            query.since = since.as_deref().map(parse_day).transpose()?;
            query.limit = limit;
            query.offset = offset;
            print_json(&service.list_events(&query)?)
        }
        Command::Scan { user, image } => {
            let mut registry = AnalyzerRegistry::new();
            registry.set_max_image_bytes(config.analyzer.max_image_bytes);
            registry.select_preferred(config.analyzer.preferred_provider());

            let bytes = std::fs::read(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;
            let receipt = ReceiptImage::new(mime_type_for(&image), bytes);
            let analysis = registry.analyze_active(&receipt)?;
            let now = Local::now().naive_local();
            let footprint = service.record_receipt(&user, now, &analysis)?;
            print_json(&serde_json::json!({
                "analysis": analysis,
                "footprint": footprint,
            }))
        }
    }
}

fn estimate_impact(
    category: &str,
    subcategory: Option<&str>,
    amount: Option<f64>,
    quantity: Option<f64>,
) -> Result<f64> {
    let category = parse_category(category)?;
    let Some(amount) = amount else {
        bail!("either --impact or --amount is required");
    };
    Ok(calculate_carbon_impact(
        category,
        subcategory.unwrap_or_default(),
        amount,
        quantity,
    ))
}

fn parse_category(value: &str) -> Result<Category> {
    Category::parse(value).with_context(|| format!("unknown category `{value}`"))
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date `{value}`, expected YYYY-MM-DD"))
}

fn at_day(value: Option<&str>, today: NaiveDate) -> Result<NaiveDateTime> {
    let day = match value {
        Some(value) => parse_day(value)?,
        None => today,
    };
    Ok(day.and_time(Local::now().time()))
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Human-readable strings for the dashboard header.
fn summary_display(summary: &PeriodSummary) -> serde_json::Value {
    serde_json::json!({
        "current_total": format_carbon_value(summary.current_total),
        "previous_total": format_carbon_value(summary.previous_total),
        "level": summary.level.description(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{estimate_impact, mime_type_for, parse_day, summary_display};
    use ecotrack_core::{CarbonLevel, CategoryTotals, Category, PeriodSummary, Trend};
    use std::path::Path;

    #[test]
    fn summary_display_formats_totals_and_level() {
        let summary = PeriodSummary {
            current_total: 0.8,
            previous_total: 120.0,
            trend: Trend::Down,
            change_percentage: 99.3,
            by_category: CategoryTotals::single(Category::Food, 0.8),
            top_category: Category::Food,
            recommendations: Vec::new(),
            level: CarbonLevel::classify(0.8),
        };
        let display = summary_display(&summary);
        assert_eq!(display["current_total"], "800g CO₂");
        assert_eq!(display["previous_total"], "120.0kg CO₂");
        assert_eq!(display["level"], "Your carbon footprint is very low!");
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_type_for(Path::new("r.JPG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("r.pdf")), "application/octet-stream");
    }

    #[test]
    fn impact_is_estimated_from_amount() {
        let impact = estimate_impact("food", Some("beef"), Some(2.0), None).unwrap();
        assert!((impact - 54.0).abs() < 1e-9);
        assert!(estimate_impact("fuel", None, Some(1.0), None).is_err());
    }

    #[test]
    fn dates_must_be_iso() {
        assert!(parse_day("2025-02-30").is_err());
        assert!(parse_day("2025-02-28").is_ok());
    }
}
