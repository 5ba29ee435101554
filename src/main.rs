use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use loctag::config::Config;
use loctag::engine::AcquisitionState;
use loctag::geo::AuthorizationStatus;
use loctag::geocode::create_geocoder;
use loctag::session::AcquisitionSession;
use loctag::simulate::{self, SimulationSettings};
use loctag::store::{CATEGORIES, LocationStore, TaggedLocation};

#[derive(Parser)]
#[command(author, version, about = "A tool to tag your current location in a local datastore")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize with a default config file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Acquire a location fix and show its address
    Acquire {
        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Acquire a location fix and tag it in the datastore
    Tag {
        /// What to note about this place
        #[arg(short, long, default_value = "")]
        description: String,

        /// Category for this place
        #[arg(long, default_value = "No Category")]
        category: String,

        /// Photo to attach
        #[arg(long, value_name = "FILE")]
        photo: Option<PathBuf>,

        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// List tagged locations grouped by category
    List {
        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show status of the datastore
    Status {
        /// Path to config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { force, config } => {
            init_config(config, *force)?;
            Ok(())
        }
        Commands::Acquire { config } => {
            let config_data = load_config(config)?;
            let state = acquire_fix(&config_data).await?;
            report_fix(&state);
            Ok(())
        }
        Commands::Tag {
            description,
            category,
            photo,
            config,
        } => {
            let config_data = load_config(config)?;

            if !CATEGORIES.contains(&category.as_str()) {
                println!(
                    "Note: '{category}' is not a known category (known: {})",
                    CATEGORIES.join(", ")
                );
            }

            let state = acquire_fix(&config_data).await?;
            let Some(sample) = &state.best_sample else {
                report_fix(&state);
                anyhow::bail!("No location fix acquired; nothing was tagged");
            };

            let mut location = TaggedLocation::new(
                description.clone(),
                category.clone(),
                sample.coordinate.latitude,
                sample.coordinate.longitude,
            );
            if let Some(address) = &state.resolved_address {
                location.set_address(address.clone());
            }
            if let Some(photo_path) = photo {
                location.attach_photo(photo_path)?;
            }

            let data_file_path = PathBuf::from(&config_data.data_file);
            let mut store =
                LocationStore::load(&data_file_path).context("Failed to load datastore")?;
            let id = location.id.clone();
            store.add_or_update(location);
            store.save(&data_file_path).context("Failed to save datastore")?;

            println!("Tagged ({id})");
            Ok(())
        }
        Commands::List { config } => {
            let config_data = load_config(config)?;

            let data_file_path = PathBuf::from(&config_data.data_file);
            let store =
                LocationStore::load(&data_file_path).context("Failed to load datastore")?;

            if store.count() == 0 {
                println!("No tagged locations yet");
                return Ok(());
            }

            for (category, locations) in store.by_category() {
                println!("{category}:");
                for location in locations {
                    println!(
                        "  {}  {}  ({:.8}, {:.8})",
                        location.date.format("%Y-%m-%d %H:%M"),
                        location.title(),
                        location.latitude,
                        location.longitude
                    );
                    if let Some(address) = &location.address {
                        println!("      {}", address.formatted_address);
                    }
                }
            }
            Ok(())
        }
        Commands::Status { config } => {
            let config_data = load_config(config)?;
            println!("loctag Status");
            println!("Configuration:");
            println!("  Data file: {}", config_data.data_file);
            println!("  Desired accuracy: {} m", config_data.desired_accuracy_m);
            println!("  Session deadline: {} s", config_data.deadline_seconds);
            match &config_data.geocoder_endpoint {
                Some(endpoint) => println!("  Geocoder: {endpoint}"),
                None => println!("  Geocoder: offline mock"),
            }

            let data_file_path = PathBuf::from(&config_data.data_file);
            let store = match LocationStore::load(&data_file_path) {
                Ok(store) => store,
                Err(err) => {
                    println!("Warning: Could not load datastore: {err}");
                    println!("Using empty datastore instead");
                    LocationStore::new()
                }
            };

            println!("\nDatastore:");
            println!("  Tagged locations: {}", store.count());
            println!(
                "  Locations with address: {}/{}",
                store.with_address_count(),
                store.count()
            );
            println!(
                "  Locations with photo: {}/{}",
                store.with_photo_count(),
                store.count()
            );
            println!("  Last updated: {}", store.last_updated);
            Ok(())
        }
    }
}

/// Runs one acquisition session against the simulated receiver, printing
/// state transitions as they happen
async fn acquire_fix(config: &Config) -> Result<AcquisitionState> {
    let geocoder = create_geocoder(
        config.geocoder_endpoint.as_deref(),
        &config.geocoder_user_agent,
    )?;
    let session = AcquisitionSession::new(config.tuning(), Arc::from(geocoder));

    let (updates, mut watcher) = watch::channel(AcquisitionState::default());
    let printer = tokio::spawn(async move {
        let mut last = String::new();
        while watcher.changed().await.is_ok() {
            let line = watcher.borrow_and_update().status_line();
            if line != last && !line.is_empty() {
                println!("  {line}");
                last = line;
            }
        }
    });

    println!("Getting location...");
    let samples = simulate::sample_stream(SimulationSettings::default());
    let state = session
        .run(AuthorizationStatus::Authorized, samples, &updates)
        .await;

    drop(updates);
    let _ = printer.await;

    Ok(state)
}

fn report_fix(state: &AcquisitionState) {
    match &state.best_sample {
        Some(sample) => {
            println!(
                "Fix: {:.8}, {:.8} (accuracy {:.1} m)",
                sample.coordinate.latitude,
                sample.coordinate.longitude,
                sample.horizontal_accuracy
            );
            match &state.resolved_address {
                Some(address) => println!("Address:\n{address}"),
                None => println!("No address found"),
            }
        }
        None => match state.last_sample_error {
            Some(error) => println!("No fix: {error}"),
            None => println!("No fix"),
        },
    }
}

fn init_config(config_path_opt: &Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = Config::get_config_path(config_path_opt);

    if config_path.exists() && !force {
        println!("Config file already exists at {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config::default();
    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!("Created config file at {}", config_path.display());
    Ok(())
}

fn load_config(config_path_opt: &Option<PathBuf>) -> Result<Config> {
    let config_path = Config::get_config_path(config_path_opt);

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run 'loctag init' to create one.",
            config_path.display()
        );
    }

    Config::load_from_file(&config_path)
}
