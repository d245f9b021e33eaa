use graphycs::config::{Config, DEFAULT_API_KEY, DEFAULT_SYMBOL};
use graphycs::fetchers::fmp::{Endpoint, FmpFetcher};
use graphycs::models::range::{DateRange, Period};
use graphycs::render::{self, RenderOptions};
use graphycs::services::chart_service::{ChartService, ViewOptions};
use graphycs::util;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Arg, ArgMatches, Command};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

fn view_args<'help>(cmd: Command<'help>, default_from: &'help str, today: &'help str) -> Command<'help> {
    cmd.arg(
        Arg::new("from")
            .long("from")
            .value_name("DATE")
            .help("First day of the range (YYYY-MM-DD)")
            .takes_value(true)
            .default_value(default_from),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .value_name("DATE")
            .help("Last day of the range (YYYY-MM-DD)")
            .takes_value(true)
            .default_value(today),
    )
    .arg(
        Arg::new("period")
            .short('p')
            .long("period")
            .value_name("PERIOD")
            .help("Averaging period (daily, weekly, monthly)")
            .takes_value(true)
            .default_value("daily"),
    )
    .arg(
        Arg::new("select")
            .long("select")
            .value_name("DATE")
            .help("Annotate the point on this day (YYYY-MM-DD)")
            .takes_value(true),
    )
    .arg(
        Arg::new("no-annotation")
            .long("no-annotation")
            .help("Never annotate, even with --select")
            .takes_value(false),
    )
}

fn view_options(matches: &ArgMatches, config: &Config, today: NaiveDate) -> graphycs::Result<ViewOptions> {
    let from = util::parse_cli_date(matches.value_of("from").unwrap_or_default())?;
    let to = util::parse_cli_date(matches.value_of("to").unwrap_or_default())?;

    let range = DateRange::clamped(from, to, config.min_date, today);
    if range.start != from || range.end != to {
        warn!("Date range {} .. {} adjusted to {}", from, to, range);
    }

    let period = matches.value_of("period").unwrap_or("daily").parse::<Period>()?;
    let selected = matches.value_of("select").map(util::parse_cli_date).transpose()?;

    Ok(ViewOptions::new(range)
        .with_period(period)
        .with_selection(selected)
        .with_annotation(!matches.is_present("no-annotation")))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let defaults = Config::new();
    let today = chrono::Local::now().date_naive();
    let today_str = today.format("%Y-%m-%d").to_string();
    let default_from = defaults.default_start.format("%Y-%m-%d").to_string();
    let default_width = defaults.chart_width.to_string();
    let default_height = defaults.chart_height.to_string();

    let app = Command::new("graphycs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stock price chart for a single ticker")
        .arg_required_else_help(true)
        .arg(
            Arg::new("symbol")
                .short('s')
                .long("symbol")
                .value_name("SYMBOL")
                .help("Ticker symbol")
                .takes_value(true)
                .global(true)
                .default_value(DEFAULT_SYMBOL),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("Financial Modeling Prep API key")
                .takes_value(true)
                .global(true)
                .default_value(DEFAULT_API_KEY),
        )
        .arg(
            Arg::new("endpoint")
                .short('e')
                .long("endpoint")
                .value_name("ENDPOINT")
                .help("Price endpoint (daily, hourly)")
                .takes_value(true)
                .global(true)
                .default_value("daily"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("API base URL")
                .takes_value(true)
                .global(true),
        );

    let chart_cmd = view_args(Command::new("chart"), &default_from, &today_str)
        .about("Render the chart to a PNG file")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output PNG path")
                .takes_value(true)
                .default_value("chart.png"),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("PIXELS")
                .takes_value(true)
                .default_value(&default_width),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_name("PIXELS")
                .takes_value(true)
                .default_value(&default_height),
        );

    let show_cmd = view_args(Command::new("show"), &default_from, &today_str)
        .about("Print the displayed series")
        .arg(
            Arg::new("limit")
                .short('l')
                .long("limit")
                .value_name("LIMIT")
                .help("Maximum number of points to print")
                .takes_value(true)
                .default_value("20"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the view as JSON")
                .takes_value(false),
        );

    let matches = app.subcommand(chart_cmd).subcommand(show_cmd).get_matches();

    let mut config = Config::new()
        .with_symbol(matches.value_of("symbol").unwrap_or(DEFAULT_SYMBOL))
        .with_api_key(matches.value_of("api-key").unwrap_or(DEFAULT_API_KEY))
        .with_endpoint(matches.value_of("endpoint").unwrap_or("daily").parse::<Endpoint>()?);
    if let Some(base_url) = matches.value_of("base-url") {
        config = config.with_base_url(base_url);
    }

    let (command, sub_matches) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => {
            info!("No command specified. Use --help for usage information.");
            return Ok(());
        }
    };

    let options = view_options(sub_matches, &config, today)?;
    info!("Showing {} ({}) for {}", config.symbol, options.period, options.range);

    let service = ChartService::new(Arc::new(FmpFetcher::new(&config)?));
    service.subscribe(|points| debug!("Series changed: {} records", points.len()));
    service
        .load()
        .await
        .with_context(|| format!("Failed to load prices for {}", config.symbol))?;

    let view = service.view(&options)?;
    if view.points.is_empty() {
        warn!("No data to display for {} in {}", view.symbol, view.range);
    }

    match command {
        "chart" => {
            let output = PathBuf::from(sub_matches.value_of("output").unwrap_or("chart.png"));
            let width = sub_matches.value_of("width").unwrap_or_default().parse::<u32>()
                .context("Invalid --width")?;
            let height = sub_matches.value_of("height").unwrap_or_default().parse::<u32>()
                .context("Invalid --height")?;
            let config = config.with_chart_size(width, height);
            let render_options = RenderOptions::from(&config);
            render::render_chart(&view, &render_options, &output)?;
            println!("{}", output.display());
        }
        "show" => {
            if sub_matches.is_present("json") {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                let limit = sub_matches.value_of("limit").unwrap_or("20").parse::<usize>()
                    .context("Invalid --limit")?;
                print!("{}", render::format_table(&view, limit));
            }
        }
        other => anyhow::bail!("Unknown command: {}", other),
    }

    Ok(())
}
