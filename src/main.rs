use anyhow::{bail, Context};
use chrono::{Local, Utc};
use clap::Parser;
use cropwater::cli::{Cli, Commands, DemandArgs, ScheduleArgs};
use cropwater::config::Config;
use cropwater::datasources::{Region, WeatherService};
use cropwater::db::{Database, DEFAULT_RETENTION_DAYS};
use cropwater::logic::{IrrigationPlanner, StrategyKind};
use cropwater::models::{AreaUnit, FarmArea, IrrigationMethod, Location};
use cropwater::output;
use cropwater::tables::ParameterTables;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let mut cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let command = cli
        .command
        .take()
        .unwrap_or_else(|| Commands::Schedule(ScheduleArgs::default()));

    match command {
        Commands::Init => {
            Config::setup_interactive().context("setup failed")?;
        }
        Commands::Schedule(args) => {
            let config = require_config(&cli.config)?;
            run_schedule(config, &cli, args).await?;
        }
        Commands::Demand(args) => {
            let config = require_config(&cli.config)?;
            run_demand(config, args).await?;
        }
        Commands::Soils { json } => {
            let tables = load_tables(&optional_config(&cli.config)?)?;
            if json {
                print_json(&tables.soils().collect::<Vec<_>>())?;
            } else {
                print!("{}", output::render_soils(&tables));
            }
        }
        Commands::Crops { json } => {
            let tables = load_tables(&optional_config(&cli.config)?)?;
            if json {
                print_json(&tables.crops().collect::<Vec<_>>())?;
            } else {
                print!("{}", output::render_crops(&tables));
            }
        }
        Commands::History { limit, json } => {
            let db = open_db(&cli)?;
            let listings = db.list_reports(limit)?;
            if json {
                print_json(&listings)?;
            } else {
                print!("{}", output::render_history(&listings, Utc::now()));
            }
        }
        Commands::Show { id, json } => {
            let db = open_db(&cli)?;
            let report = db.get_report(&id)?;
            if json {
                print_json(&report)?;
            } else {
                print!("{}", output::render_report(&report));
            }
        }
        Commands::Delete { id } => {
            open_db(&cli)?.delete_report(&id)?;
            println!("Deleted report {}", id);
        }
        Commands::Purge => {
            let purged = open_db(&cli)?.purge_expired(Utc::now())?;
            println!("Purged {} expired report(s)", purged);
        }
        Commands::Retention { set } => {
            let db = open_db(&cli)?;
            if let Some(days) = set {
                db.set_retention_days(days)?;
            }
            let default = optional_config(&cli.config)?.reports.retention_days;
            println!("Reports are kept for {} day(s)", db.retention_days(default)?);
        }
        Commands::Check => {
            let config = require_config(&cli.config)?;
            run_check(config, &cli).await?;
        }
    }

    Ok(())
}

/// Load the config, running first-time setup when none exists yet.
fn require_config(path: &Option<std::path::PathBuf>) -> anyhow::Result<Config> {
    if !Config::exists(path.as_ref()) {
        if path.is_some() {
            bail!("config file {:?} does not exist", path);
        }
        println!("No configuration found.");
        let (config, _) = Config::setup_interactive().context("setup failed")?;
        return Ok(config);
    }
    Config::load(path.clone()).context("could not load configuration")
}

/// Load the config if one exists; table listings work without one.
fn optional_config(path: &Option<std::path::PathBuf>) -> anyhow::Result<Config> {
    if Config::exists(path.as_ref()) {
        Config::load(path.clone()).context("could not load configuration")
    } else {
        Ok(Config::default())
    }
}

fn load_tables(config: &Config) -> anyhow::Result<ParameterTables> {
    ParameterTables::with_overrides(&config.tables).context("invalid table overrides in config")
}

fn open_db(cli: &Cli) -> anyhow::Result<Database> {
    Database::open(cli.data_dir.as_ref()).context("could not open report database")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn weather_service(config: &Config, offline: bool) -> WeatherService {
    if offline {
        WeatherService::offline(&config.weather)
    } else {
        WeatherService::new(&config.weather)
    }
}

async fn run_schedule(mut config: Config, cli: &Cli, args: ScheduleArgs) -> anyhow::Result<()> {
    let mut request = config.farm.to_request();
    if let Some(soil) = args.soil {
        request.soil_type = soil;
    }
    if let Some(crop) = args.crop {
        request.crop = crop;
    }
    if let Some(stage) = args.stage {
        request.growth_stage = stage;
    }
    if let Some(unit) = args.unit {
        let unit = AreaUnit::from_str(&unit)
            .with_context(|| format!("unknown area unit '{}'", unit))?;
        request.area.unit = unit;
    }
    if let Some(area) = args.area {
        request.area = FarmArea {
            value: area,
            unit: request.area.unit,
        };
    }
    if let Some(method) = args.method {
        request.irrigation_method = IrrigationMethod::from_str(&method)
            .with_context(|| format!("unknown irrigation method '{}'", method))?;
    }
    if let Some(location) = args.location {
        request.location = Location::parse(&location);
    }
    if let Some(strategy) = args.strategy {
        config.simulation.strategy = StrategyKind::from_str(&strategy)
            .with_context(|| format!("unknown strategy '{}'", strategy))?;
    }

    let tables = load_tables(&config)?;
    let weather = weather_service(&config, args.offline);
    let mut planner = IrrigationPlanner::new(tables, weather, config.simulation);

    if !args.no_save {
        let db = open_db(cli)?;
        db.purge_expired(Utc::now())?;
        planner = planner.with_database(db, config.reports.retention_days);
    }

    let report = planner
        .plan(&request)
        .await
        .with_context(|| format!("could not schedule {} on {}", request.crop, request.soil_type))?;

    if args.json {
        print_json(&report)?;
    } else {
        print!("{}", output::render_report(&report));
    }
    Ok(())
}

async fn run_demand(config: Config, args: DemandArgs) -> anyhow::Result<()> {
    let crop = args.crop.unwrap_or_else(|| config.farm.crop.clone());
    let stage = args.stage.unwrap_or(config.farm.growth_stage);
    let location = args
        .location
        .map(|l| Location::parse(&l))
        .unwrap_or_else(|| config.farm.location.clone());

    let tables = load_tables(&config)?;
    let weather = weather_service(&config, args.offline);
    let planner = IrrigationPlanner::new(tables, weather, config.simulation);

    let estimate = planner
        .estimate_demand(&crop, stage, &location, Local::now().date_naive())
        .await?;

    if args.json {
        print_json(&estimate)?;
    } else {
        print!("{}", output::render_demand(&estimate));
    }
    Ok(())
}

async fn run_check(config: Config, cli: &Cli) -> anyhow::Result<()> {
    println!("Configuration");
    println!("  Farm:      {}", config.farm.name);
    println!("  Strategy:  {:?}", config.simulation.strategy);
    println!("  Weather:   {:?}", config.weather);

    let tables = load_tables(&config)?;
    let request = config.farm.to_request();
    let soil = tables.soil(&request.soil_type);
    let crop = tables.crop(&request.crop);
    match (&soil, &crop) {
        (Ok(soil), Ok(crop)) => {
            let awc = cropwater::logic::available_water_capacity(soil, crop)?;
            println!("  Tables:    OK ({} on {}, AWC {:.1} mm)", crop.name, soil.name, awc);
        }
        _ => {
            if let Err(e) = soil {
                println!("  Tables:    {}", e);
            }
            if let Err(e) = crop {
                println!("  Tables:    {}", e);
            }
        }
    }

    let weather = WeatherService::new(&config.weather);
    println!(
        "  Forecast:  {} day(s), synthetic region {}",
        weather.forecast_days(),
        Region::classify(&request.location).as_str()
    );
    if weather.has_primary() {
        if weather.test_connection(&request.location).await {
            println!("  WeatherAPI: OK");
        } else {
            println!("  WeatherAPI: OFFLINE (synthetic forecasts will be used)");
        }
    } else {
        println!("  WeatherAPI: not configured (synthetic forecasts will be used)");
    }

    let db = open_db(cli)?;
    println!("  Database:  {}", db.path().display());
    println!(
        "  Retention: {} day(s)",
        db.retention_days(config.reports.retention_days)
            .unwrap_or(DEFAULT_RETENTION_DAYS)
    );
    Ok(())
}
