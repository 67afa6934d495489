use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use weekender_pricing::{
    domain::{days_between, evaluate_query, PriceQuery, PriceResult, QueryDates},
    infra::{inspect_rules, load_rules, QuoteRequest},
    util::{
        settings::{load_settings, save_settings, settings_file, PricingSettings},
        version::{version_label, APP_NAME},
    },
};

#[derive(Parser)]
#[command(name = "weekender-pricing", version, about = "Seasonal venue price quotes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a date or booking range against a rules export.
    Quote(QuoteArgs),
    /// Report rules that can never change a price.
    Check {
        #[arg(long, env = "WEEKENDER_RULES")]
        rules: Option<PathBuf>,
    },
    /// Show the settings file, or write one with defaults.
    Config {
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args)]
struct QuoteArgs {
    /// Venue base price before seasonal adjustment.
    #[arg(long = "base", allow_negative_numbers = true)]
    base_price: f64,
    /// Single event date (YYYY-MM-DD).
    #[arg(long, conflicts_with_all = ["from", "to"])]
    date: Option<String>,
    /// First day of a booking range.
    #[arg(long, requires = "to")]
    from: Option<String>,
    /// Last day of a booking range.
    #[arg(long, requires = "from")]
    to: Option<String>,
    #[arg(long, env = "WEEKENDER_RULES")]
    rules: Option<PathBuf>,
    /// Print the full result as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("{APP_NAME} {}", version_label());

    match cli.command {
        Command::Quote(args) => quote(args, &settings),
        Command::Check { rules } => check(rules, &settings),
        Command::Config { init } => config(init, &settings),
    }
}

fn rules_path(flag: Option<PathBuf>, settings: &PricingSettings) -> anyhow::Result<PathBuf> {
    match flag.or_else(|| settings.rules_path.clone()) {
        Some(path) => Ok(path),
        None => bail!("no rules file given; pass --rules or set rules_path in the settings file"),
    }
}

fn quote(args: QuoteArgs, settings: &PricingSettings) -> anyhow::Result<()> {
    let path = rules_path(args.rules, settings)?;
    let rules = load_rules(&path).with_context(|| format!("loading {}", path.display()))?;

    let query = PriceQuery::try_from(QuoteRequest {
        base_price: args.base_price,
        event_date: args.date,
        range_start: args.from,
        range_end: args.to,
    })?;

    let result = evaluate_query(&query, &rules);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_quote(&query, &result, &settings.currency_symbol);
    }
    Ok(())
}

fn print_quote(query: &PriceQuery, result: &PriceResult, currency: &str) {
    match query.dates {
        QueryDates::Single { date } => println!("Date:            {date}"),
        QueryDates::Range { start, end } => println!(
            "Dates:           {start} to {end} ({} days)",
            days_between(start, end) + 1
        ),
    }
    println!("Base price:      {currency}{:.2}", result.base_price);
    println!(
        "Adjusted price:  {currency}{:.2} ({:+.2}, {:+.2}%)",
        result.adjusted_price, result.total_adjustment, result.adjustment_percentage
    );
    println!("{}", result.description);

    if result.applicable_rules.len() > 1 {
        let names: Vec<&str> = result
            .applicable_rules
            .iter()
            .map(|rule| rule.season_name.as_str())
            .collect();
        println!("Matching seasons: {} (first one applied)", names.join(", "));
    }
}

fn check(rules: Option<PathBuf>, settings: &PricingSettings) -> anyhow::Result<()> {
    let path = rules_path(rules, settings)?;
    let rules = load_rules(&path).with_context(|| format!("loading {}", path.display()))?;
    let issues = inspect_rules(&rules);

    if issues.is_empty() {
        println!("{} rules, no issues", rules.len());
        return Ok(());
    }

    for issue in &issues {
        println!("{issue}");
    }
    bail!("{} issue(s) in {} rules", issues.len(), rules.len())
}

fn config(init: bool, settings: &PricingSettings) -> anyhow::Result<()> {
    if init {
        let path = save_settings(&PricingSettings::default())?;
        println!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    match settings_file() {
        Some(path) => println!("Settings file: {}", path.display()),
        None => println!("Settings file: unavailable on this platform"),
    }
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
