//! Skycast command line interface.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use skycast_cache::{CacheAccessor, CacheStore, MemoryStore, RedisStore};
use skycast_core::Config;
use skycast_history::HistoryStore;
use skycast_weather::{
    recent_unique, LookupError, Source, SuggestClient, WeatherLookup, WeatherService,
    WeatherstackClient,
};

#[derive(Parser)]
#[command(name = "skycast", about = "Weather lookups with a Redis-backed cache")]
struct Cli {
    /// Account the search history is kept under
    #[arg(long, default_value_t = 1, global = true)]
    user: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Current weather for a city
    City {
        /// City name, e.g. "London"
        name: String,
    },
    /// Current weather for a coordinate pair
    Coords {
        /// Latitude in decimal degrees
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in decimal degrees
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
    /// Past searches, most recent first
    History {
        /// Maximum number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Unique recent searches, ready for a quick re-lookup
    Recent {
        /// Maximum number of entries to show
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Suggest city names matching a partial query
    Suggest {
        /// Partial city name, at least two characters
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    skycast_core::init()?;

    let (config, _) = Config::load_validated()?;

    match cli.command {
        Command::City { name } => {
            let service = build_service(&config).await?;
            let history = open_history(&config)?;
            match service.current_by_city(&name).await {
                Ok(lookup) => {
                    if let Err(e) = history.record(cli.user, &name) {
                        tracing::warn!("Failed to record search: {}", e);
                    }
                    print_lookup(&lookup);
                }
                Err(e) => exit_with(e),
            }
        }
        Command::Coords { lat, lng } => {
            let service = build_service(&config).await?;
            let history = open_history(&config)?;
            match service.current_by_coords(lat, lng).await {
                Ok(lookup) => {
                    let resolved = lookup.report.location.name.trim();
                    if !resolved.is_empty() {
                        if let Err(e) = history.record(cli.user, resolved) {
                            tracing::warn!("Failed to record search: {}", e);
                        }
                    }
                    print_lookup(&lookup);
                }
                Err(e) => exit_with(e),
            }
        }
        Command::History { limit } => {
            let history = open_history(&config)?;
            let records = history.list_for_user(cli.user)?;
            if records.is_empty() {
                println!("No searches recorded yet.");
            }
            for record in records.into_iter().take(limit) {
                println!(
                    "{}  {}",
                    record.searched_at.format("%Y-%m-%d %H:%M"),
                    record.city
                );
            }
        }
        Command::Recent { limit } => {
            let history = open_history(&config)?;
            let cities = history.recent(cli.user, limit.saturating_mul(2))?;
            let unique = recent_unique(&cities, limit);
            if unique.is_empty() {
                println!("No searches recorded yet.");
            }
            for city in unique {
                println!("{}", city);
            }
        }
        Command::Suggest { query } => {
            let suggest = SuggestClient::new(
                &config.suggest.base_url,
                &config.suggest.username,
                Duration::from_secs(config.suggest.timeout_secs),
            );
            let suggestions = suggest.suggest(&query).await;
            if suggestions.is_empty() {
                println!("No matching cities found.");
            }
            for suggestion in suggestions {
                println!("{}", suggestion.display);
            }
        }
    }

    Ok(())
}

/// Assemble the lookup service from configuration.
///
/// An unreachable Redis downgrades to a per-process cache so lookups
/// keep working.
async fn build_service(config: &Config) -> Result<WeatherService> {
    let Some(access_key) = config.origin.access_key.clone() else {
        bail!("no Weatherstack access key configured; set WEATHERSTACK_API_KEY or add it to the config file");
    };

    let store: Arc<dyn CacheStore> = match &config.cache.redis_url {
        Some(url) => match RedisStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!("Redis unavailable, using in-process cache: {}", e);
                Arc::new(MemoryStore::new())
            }
        },
        None => {
            tracing::info!("No Redis URL configured, using in-process cache");
            Arc::new(MemoryStore::new())
        }
    };

    let client = WeatherstackClient::new(
        &config.origin.base_url,
        &access_key,
        Duration::from_secs(config.origin.timeout_secs),
    )?;

    Ok(WeatherService::new(
        CacheAccessor::new(store),
        client,
        Duration::from_secs(config.cache.ttl_secs),
    ))
}

fn open_history(config: &Config) -> Result<HistoryStore> {
    HistoryStore::new(&config.history.db_path).context("failed to open search history database")
}

fn print_lookup(lookup: &WeatherLookup) {
    let location = &lookup.report.location;
    let current = &lookup.report.current;

    if location.region.is_empty() || location.region == location.name {
        println!("{}, {}", location.name, location.country);
    } else {
        println!(
            "{}, {}, {}",
            location.name, location.region, location.country
        );
    }

    let description = current.weather_descriptions.join(", ");
    if description.is_empty() {
        println!(
            "  {:.0}°C (feels like {:.0}°C)",
            current.temperature, current.feelslike
        );
    } else {
        println!(
            "  {:.0}°C (feels like {:.0}°C), {}",
            current.temperature, current.feelslike, description
        );
    }
    println!(
        "  Wind {:.0} km/h {}, humidity {}%",
        current.wind_speed, current.wind_dir, current.humidity
    );
    if !current.observation_time.is_empty() {
        println!("  Observed at {} UTC", current.observation_time);
    }
    if lookup.source == Source::Cache {
        println!("  (cached)");
    }
}

fn exit_with(error: LookupError) -> ! {
    tracing::debug!("Lookup failed: {}", error);
    eprintln!("{}", error.user_message());
    std::process::exit(1);
}
