//! Foodshare CLI - food donation dashboard over a SQLite database

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use foodshare::config::{self, FoodshareConfig};
use foodshare::model::{parse_date, parse_timestamp};
use foodshare::report::{self, chart_for, Analytic, CatalogRun};
use foodshare::storage::ListingFilter;
use foodshare::ui::{self, Icons};
use foodshare::{
    CatalogQuery, Claim, ClaimStatus, EntityKind, FoodListing, FoodStore, FoodType, MealType,
    MenuAction, Provider, ProviderType, Receiver, ReceiverType,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "foodshare")]
#[command(version)]
#[command(about = "Food donation dashboard - reports and record management over SQLite")]
#[command(long_about = r#"
Foodshare tracks food providers, receivers, listings and claims, with:
  • Fifteen fixed reporting queries with chart rendering
  • Dashboard overview and analytics
  • Add, update and delete for every record type
  • A JSON API (foodshare serve)

Example usage:
  foodshare init
  foodshare report --query 14
  foodshare listings --city Pune --food-type vegan
  foodshare delete claim --id 3 --confirm
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Only print results and errors (also FOODSHARE_QUIET=1)
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and its tables
    Init,

    /// Show headline figures and the most recent listings
    Dashboard,

    /// Run catalog queries; without arguments lists the catalog
    Report {
        /// Query number (1-15)
        #[arg(short, long, conflicts_with = "all")]
        query: Option<usize>,

        /// Run every query in order
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Provider, claim status and food type analytics
    Analytics {
        /// Single analytic (provider_contribution, claims_status, food_type_distribution)
        name: Option<String>,
    },

    /// Browse food listings
    Listings {
        #[arg(long)]
        city: Option<String>,

        #[arg(long, value_parser = FoodType::from_str)]
        food_type: Option<FoodType>,

        #[arg(long, value_parser = MealType::from_str)]
        meal_type: Option<MealType>,
    },

    /// List providers
    Providers {
        /// Only providers in this city
        #[arg(long)]
        city: Option<String>,
    },

    /// List receivers
    Receivers,

    /// List claims with food and receiver names
    Claims,

    /// Add a record
    Add {
        #[command(subcommand)]
        entity: AddEntity,
    },

    /// Update a record
    Update {
        #[command(subcommand)]
        entity: UpdateEntity,
    },

    /// Delete a record by id
    Delete {
        #[arg(value_enum)]
        entity: EntityArg,

        #[arg(long)]
        id: i64,

        /// Required; without it nothing is deleted
        #[arg(long)]
        confirm: bool,
    },

    /// List dashboard sections and their commands
    Menu {
        /// Describe one section, by its command name
        #[arg(value_parser = MenuAction::from_str)]
        section: Option<MenuAction>,
    },

    /// Serve the JSON API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum AddEntity {
    Provider {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_parser = ProviderType::from_str)]
        provider_type: ProviderType,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        contact: String,
    },
    Receiver {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_parser = ReceiverType::from_str)]
        receiver_type: ReceiverType,
        #[arg(long)]
        city: String,
        #[arg(long)]
        contact: String,
    },
    Listing {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: u32,
        /// YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        expiry: NaiveDate,
        #[arg(long)]
        provider_id: i64,
        #[arg(long, value_parser = ProviderType::from_str)]
        provider_type: ProviderType,
        #[arg(long)]
        location: String,
        #[arg(long, value_parser = FoodType::from_str)]
        food_type: FoodType,
        #[arg(long, value_parser = MealType::from_str)]
        meal_type: MealType,
    },
    Claim {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        food_id: i64,
        #[arg(long)]
        receiver_id: i64,
        #[arg(long, value_parser = ClaimStatus::from_str, default_value = "Pending")]
        status: ClaimStatus,
        /// YYYY-MM-DD HH:MM:SS, defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        timestamp: Option<NaiveDateTime>,
    },
}

#[derive(Subcommand)]
enum UpdateEntity {
    ProviderContact {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        contact: String,
    },
    ReceiverContact {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        contact: String,
    },
    ListingQuantity {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        quantity: u32,
    },
    ClaimStatus {
        #[arg(long)]
        id: i64,
        #[arg(long, value_parser = ClaimStatus::from_str)]
        status: ClaimStatus,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EntityArg {
    Provider,
    Receiver,
    Listing,
    Claim,
}

impl From<EntityArg> for EntityKind {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Provider => EntityKind::Provider,
            EntityArg::Receiver => EntityKind::Receiver,
            EntityArg::Listing => EntityKind::FoodListing,
            EntityArg::Claim => EntityKind::Claim,
        }
    }
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a starter foodshare.toml
    Init {
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Dashboard section served by this command
    fn action(&self) -> Option<MenuAction> {
        match self {
            Commands::Dashboard => Some(MenuAction::Dashboard),
            Commands::Report { .. } => Some(MenuAction::QueryResults),
            Commands::Analytics { .. } => Some(MenuAction::Analytics),
            Commands::Listings { .. } => Some(MenuAction::FoodListings),
            Commands::Providers { .. } => Some(MenuAction::Providers),
            Commands::Receivers => Some(MenuAction::Receivers),
            Commands::Claims => Some(MenuAction::Claims),
            Commands::Add { .. } => Some(MenuAction::AddRecords),
            Commands::Update { .. } => Some(MenuAction::UpdateRecords),
            Commands::Delete { .. } => Some(MenuAction::DeleteRecords),
            Commands::Init | Commands::Menu { .. } | Commands::Serve { .. } | Commands::Config { .. } => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    foodshare::output::init(cli.quiet);

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = config::load_config(cli.config.as_deref())?;
    let database = settings.database_path(cli.database.as_deref());

    if let Err(e) = run(cli.command, &settings, &database, cli.config.as_deref()) {
        match e.downcast_ref::<foodshare::Error>() {
            Some(err) if err.is_recoverable() => {
                ui::error(&err.to_string());
                std::process::exit(1);
            }
            _ => return Err(e),
        }
    }

    Ok(())
}

fn run(
    command: Commands,
    settings: &FoodshareConfig,
    database: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(action) = command.action() {
        tracing::debug!(section = action.label(), "dispatch");
        if !matches!(command, Commands::Report { format: OutputFormat::Json, .. }) {
            ui::header(action.icon(), action.label());
        }
    }

    match command {
        Commands::Init => {
            config::ensure_db_dir(database)?;
            let spinner = ui::Spinner::new("Creating tables");
            FoodStore::create(database)?;
            spinner.finish_and_clear();
            ui::success(&format!("Database ready at {}", database.display()));
        }

        Commands::Dashboard => {
            let store = FoodStore::open(database)?;
            let overview = store.overview()?;
            println!(
                "{}",
                ui::stats_table(&[
                    ("Total Providers", overview.providers.to_string()),
                    ("Total Receivers", overview.receivers.to_string()),
                    ("Food Listings", overview.food_listings.to_string()),
                    ("Total Claims", overview.claims.to_string()),
                    ("Total Quantity Available", format!("{} units", overview.total_quantity)),
                    ("Pending Claims", overview.pending_claims.to_string()),
                ])
            );

            ui::section(&format!("{} Recent Food Listings", Icons::NEWS));
            let recent = store.recent_food_listings(settings.recent_limit())?;
            if recent.is_empty() {
                ui::no_data("No food listings yet.");
            } else {
                println!("{}", ui::result_table(&recent));
            }
        }

        Commands::Report { query, all, format } => {
            let store = FoodStore::open(database)?;
            if all {
                report_all(&store, format)?;
            } else if let Some(number) = query {
                let query = CatalogQuery::from_number(number).ok_or_else(|| {
                    foodshare::Error::InvalidValue(format!(
                        "Query number must be between 1 and {}",
                        CatalogQuery::COUNT
                    ))
                })?;
                let run = CatalogRun {
                    query,
                    result: report::run(&store, query),
                };
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run.to_json())?),
                    OutputFormat::Table => print_catalog_run(&run),
                }
            } else {
                for query in CatalogQuery::all() {
                    println!("  {}", query.description());
                }
                println!();
                println!("{}", ui::dim("Run one with --query N, or all with --all"));
            }
        }

        Commands::Analytics { name } => {
            let store = FoodStore::open(database)?;
            let selected: Vec<Analytic> = match name {
                Some(name) => vec![name.parse()?],
                None => Analytic::all().to_vec(),
            };
            for analytic in selected {
                let run = analytic.run(&store)?;
                ui::section(&format!("{} {}", Icons::TREND, analytic.heading()));
                if !run.result.is_empty() {
                    println!("{}", ui::result_table(&run.result));
                }
                print!("{}", ui::render_spec(&run.render));
            }
        }

        Commands::Listings { city, food_type, meal_type } => {
            let store = FoodStore::open(database)?;
            let filter = ListingFilter { city, food_type, meal_type };
            let listings = store.food_listings(&filter)?;
            if listings.is_empty() {
                ui::no_data("No food listings match the filters.");
                let options = store.listing_filter_options()?;
                ui::info("Cities", &options.cities.join(", "));
                ui::info("Food types", &options.food_types.join(", "));
                ui::info("Meal types", &options.meal_types.join(", "));
            } else {
                println!("{}", listings_table(&listings));
                ui::info("Listings", &listings.len().to_string());
            }
        }

        Commands::Providers { city } => {
            let store = FoodStore::open(database)?;
            let providers = match city.as_deref() {
                Some(city) => store.providers_in_city(city)?,
                None => store.providers()?,
            };
            if providers.is_empty() {
                ui::no_data("No providers found.");
            } else {
                println!("{}", providers_table(&providers));
            }
        }

        Commands::Receivers => {
            let store = FoodStore::open(database)?;
            let receivers = store.receivers()?;
            if receivers.is_empty() {
                ui::no_data("No receivers found.");
            } else {
                println!("{}", receivers_table(&receivers));
            }
        }

        Commands::Claims => {
            let store = FoodStore::open(database)?;
            let claims = store.claims_overview()?;
            if claims.is_empty() {
                ui::no_data("No claims found.");
            } else {
                println!("{}", ui::result_table(&claims));
            }
        }

        Commands::Add { entity } => {
            let store = FoodStore::open(database)?;
            let message = match entity {
                AddEntity::Provider { id, name, provider_type, address, city, contact } => {
                    store.insert_provider(&Provider::new(id, name, provider_type, address, city, contact))?
                }
                AddEntity::Receiver { id, name, receiver_type, city, contact } => {
                    store.insert_receiver(&Receiver::new(id, name, receiver_type, city, contact))?
                }
                AddEntity::Listing {
                    id,
                    name,
                    quantity,
                    expiry,
                    provider_id,
                    provider_type,
                    location,
                    food_type,
                    meal_type,
                } => store.insert_food_listing(&FoodListing {
                    id,
                    food_name: name,
                    quantity,
                    expiry_date: expiry,
                    provider_id,
                    provider_type,
                    location,
                    food_type,
                    meal_type,
                })?,
                AddEntity::Claim { id, food_id, receiver_id, status, timestamp } => {
                    let timestamp = timestamp.unwrap_or_else(|| Local::now().naive_local());
                    store.insert_claim(&Claim::new(id, food_id, receiver_id, status, timestamp))?
                }
            };
            ui::success(&message);
        }

        Commands::Update { entity } => {
            let store = FoodStore::open(database)?;
            let message = match entity {
                UpdateEntity::ProviderContact { id, contact } => store.update_provider_contact(id, &contact)?,
                UpdateEntity::ReceiverContact { id, contact } => store.update_receiver_contact(id, &contact)?,
                UpdateEntity::ListingQuantity { id, quantity } => store.update_food_quantity(id, quantity)?,
                UpdateEntity::ClaimStatus { id, status } => store.update_claim_status(id, status)?,
            };
            ui::success(&message);
        }

        Commands::Delete { entity, id, confirm } => {
            let kind = EntityKind::from(entity);
            if !confirm {
                ui::warn(&format!(
                    "Refusing to delete {} {} without --confirm",
                    kind.as_str().to_lowercase(),
                    id
                ));
                return Ok(());
            }
            let store = FoodStore::open(database)?;
            let message = match kind {
                EntityKind::Provider => store.delete_provider(id)?,
                EntityKind::Receiver => store.delete_receiver(id)?,
                EntityKind::FoodListing => store.delete_food_listing(id)?,
                EntityKind::Claim => store.delete_claim(id)?,
            };
            ui::success(&message);
        }

        Commands::Menu { section: Some(action) } => {
            ui::header(action.icon(), action.label());
            println!("  {}", action.summary());
            if action.is_write() {
                println!("  {}", ui::muted("Changes stored records"));
            }
            println!("  {}", ui::dim(&format!("foodshare {} --help", action.command())));
        }

        Commands::Menu { section: None } => {
            ui::header(Icons::PLATE, "Food Management System");
            for action in MenuAction::all() {
                let marker = if action.is_write() { ui::muted(" (writes)") } else { String::new() };
                println!("  {}  {}{}", action, ui::dim(&format!("foodshare {}", action.command())), marker);
            }
        }

        Commands::Serve { port } => {
            let store = FoodStore::open(database)?;
            let port = settings.port(port);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(foodshare::server::start_server(port, store, settings.recent_limit()))?;
        }

        Commands::Config { command } => match command {
            ConfigCommand::Init { force } => {
                let path = config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
                config::write_config(&path, &FoodshareConfig::starter(), force)?;
                ui::success(&format!("Wrote {}", path.display()));
            }
        },
    }

    Ok(())
}

fn report_all(store: &FoodStore, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let runs: Vec<_> = report::run_all(store).iter().map(CatalogRun::to_json).collect();
            println!("{}", serde_json::to_string_pretty(&runs)?);
        }
        OutputFormat::Table => {
            let started = Instant::now();
            let progress = ui::CatalogProgress::new(CatalogQuery::COUNT);
            let mut runs = Vec::with_capacity(CatalogQuery::COUNT);
            for &query in CatalogQuery::all() {
                progress.start(query);
                runs.push(CatalogRun {
                    query,
                    result: report::run(store, query),
                });
                progress.inc();
            }
            let failed = runs.iter().filter(|r| r.result.is_err()).count();
            progress.finish_with_summary(started.elapsed(), runs.len() - failed, failed);

            for run in &runs {
                print_catalog_run(run);
            }
        }
    }
    Ok(())
}

/// Table and chart for one query; failures are reported and the caller moves on
fn print_catalog_run(run: &CatalogRun) {
    ui::section(&run.description());
    match &run.result {
        Ok(set) => {
            if !set.is_empty() {
                println!("{}", ui::result_table(set));
            }
            match chart_for(run.query, set) {
                Ok(spec) => print!("{}", ui::render_spec(&spec)),
                Err(e) => {
                    tracing::warn!("{}: {}", run.description(), e);
                    ui::error(&e.to_string());
                }
            }
        }
        Err(e) => {
            tracing::warn!("{}: {}", run.description(), e);
            ui::error(&e.to_string());
        }
    }
}

fn providers_table(providers: &[Provider]) -> String {
    let rows = providers
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.provider_type.to_string(),
                p.address.clone(),
                p.city.clone(),
                p.contact.clone(),
            ]
        })
        .collect();
    ui::rows_table(&["Provider_ID", "Name", "Type", "Address", "City", "Contact"], rows)
}

fn receivers_table(receivers: &[Receiver]) -> String {
    let rows = receivers
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                r.receiver_type.to_string(),
                r.city.clone(),
                r.contact.clone(),
            ]
        })
        .collect();
    ui::rows_table(&["Receiver_ID", "Name", "Type", "City", "Contact"], rows)
}

fn listings_table(listings: &[FoodListing]) -> String {
    let rows = listings
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.food_name.clone(),
                l.quantity.to_string(),
                l.expiry_date.format(foodshare::model::DATE_FORMAT).to_string(),
                l.provider_id.to_string(),
                l.provider_type.to_string(),
                l.location.clone(),
                l.food_type.to_string(),
                l.meal_type.to_string(),
            ]
        })
        .collect();
    ui::rows_table(
        &[
            "Food_ID",
            "Food_Name",
            "Quantity",
            "Expiry_Date",
            "Provider_ID",
            "Provider_Type",
            "Location",
            "Food_Type",
            "Meal_Type",
        ],
        rows,
    )
}
