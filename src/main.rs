//! Huntclub CLI
//!
//! Command-line front end for the hunting club API:
//! - Sign in and out, show the current member
//! - Cartridge stock, history, purchases, transfers and usage
//! - Game log and new kills
//! - Club statistics and member administration

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use huntclub::api::GameFilter;
use huntclub::app::App;
use huntclub::config::{self, Config, LoggingConfig};
use huntclub::forms::{CartridgeRow, LoginForm, RegisterForm, TypeChoice};
use huntclub::models::{
    timestamp, ChargeType, GameSex, NewCartridgeType, PelletSize, Role, User, UserCreate,
    UserUpdate,
};
use huntclub::pages::{
    guard, visit, CartridgesPage, DashboardPage, GamePage, HuntersPage, Layout, NewGamePage,
    Page, StatsPage, Visit,
};
use huntclub::render::{self, OutputFormat, Table};

#[derive(Parser)]
#[command(name = "huntclub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hunting club record keeping")]
#[command(long_about = "Track club members, cartridge stock and game from the terminal.\nTalks to the hunting club API; the session is kept between runs.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Config file (default: search the usual locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        prenom: String,
        #[arg(long)]
        nom: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in member
    Whoami,

    /// Club overview and your stock
    Dashboard,

    /// Cartridge stock
    Stock {
        /// Show another hunter's stock
        #[arg(long)]
        hunter: Option<Uuid>,
    },

    /// Purchases and usage over a period
    History {
        #[arg(long)]
        hunter: Option<Uuid>,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// List cartridge types
    Types,

    /// Record a cartridge purchase
    Purchase {
        /// Existing cartridge type
        #[arg(long = "type", conflicts_with = "brand")]
        type_id: Option<Uuid>,
        /// Brand of a new cartridge type
        #[arg(long)]
        brand: Option<String>,
        #[arg(long, default_value = "Normal")]
        charge: ChargeType,
        #[arg(long, default_value = "7")]
        pellet: PelletSize,
        #[arg(short, long, default_value_t = 25)]
        quantity: u32,
        /// Unit price in euros
        #[arg(long, default_value_t = 0.45)]
        price: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Buy for another hunter
        #[arg(long)]
        hunter: Option<Uuid>,
    },

    /// Give cartridges to another hunter
    Transfer {
        /// Recipient
        #[arg(long)]
        to: Uuid,
        #[arg(long = "type")]
        type_id: Uuid,
        #[arg(short, long)]
        quantity: u32,
        #[arg(long, default_value = "")]
        note: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record cartridges fired without a kill
    Use {
        #[arg(long = "type")]
        type_id: Uuid,
        #[arg(short, long)]
        quantity: u32,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List game species, or add one
    Species {
        #[arg(long)]
        add: Option<String>,
    },

    /// Game log
    Game {
        #[command(subcommand)]
        command: GameCommand,
    },

    /// Club statistics
    Stats {
        /// Drill into one season (starting year)
        #[arg(long)]
        season: Option<i32>,
        /// Show the efficiency ranking
        #[arg(long)]
        efficiency: bool,
    },

    /// Member administration (admins)
    Hunters {
        #[command(subcommand)]
        command: HunterCommand,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum GameCommand {
    /// List recorded game
    List {
        #[arg(long)]
        hunter: Option<Uuid>,
        /// Species name
        #[arg(long)]
        species: Option<String>,
        #[arg(long)]
        season: Option<i32>,
    },

    /// Show one record
    Show { id: Uuid },

    /// Record a kill
    New {
        /// Species name
        #[arg(long)]
        species: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        sex: Option<GameSex>,
        #[arg(long, default_value = "")]
        location: String,
        /// Cartridges used, as TYPE_ID:QUANTITY (repeatable)
        #[arg(short, long = "cartridge", required = true)]
        cartridges: Vec<String>,
    },

    /// Delete a record
    Delete { id: Uuid },
}

#[derive(Subcommand)]
pub enum HunterCommand {
    List,

    Add {
        #[arg(long)]
        prenom: String,
        #[arg(long)]
        nom: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        admin: bool,
    },

    Update {
        id: Uuid,
        #[arg(long)]
        prenom: Option<String>,
        #[arg(long)]
        nom: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },

    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let config = config::generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &config)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", config),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.api_url.clone() {
        config.api.base_url = url;
    }
    init_logging(&config.logging);

    let app = App::new(config)?;
    run(&app, cli.command, cli.format).await
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("huntclub={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

async fn run(app: &App, command: Commands, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            let mut form = LoginForm::new(email, password);
            let submitted = form.submit(app).await?;
            println!(
                "Logged in as {} ({})",
                submitted.value.display_name(),
                submitted.value.role
            );
        }

        Commands::Register {
            prenom,
            nom,
            email,
            password,
        } => {
            let mut form = RegisterForm {
                prenom,
                nom,
                email,
                confirm_password: password.clone(),
                password,
                ..Default::default()
            };
            if let Some(warning) = form.password_warning() {
                eprintln!("{}", warning);
            }
            let submitted = form.submit(app).await?;
            println!("Welcome, {}", submitted.value.display_name());
        }

        Commands::Logout => {
            app.session.logout().await?;
            println!("Logged out");
        }

        Commands::Whoami => {
            let user = signed_in(app).await?;
            match format {
                OutputFormat::Table => {
                    println!("{}", user.display_name());
                    println!("{}", user.email);
                    println!("Role: {}", user.role);
                    println!("Member since {}", render::date(&user.created_at));
                }
                _ => emit(&user_table(std::slice::from_ref(&user)), &user, format)?,
            }
        }

        Commands::Dashboard => {
            let page: DashboardPage = open(app).await?;
            show(app, &page, format).await?;
        }

        Commands::Stock { hunter } => {
            let mut page: CartridgesPage = open(app).await?;
            if let Some(hunter) = hunter {
                page.select_hunter(app, hunter).await?;
            }
            show(app, &page, format).await?;
        }

        Commands::History { hunter, from, to } => {
            let mut page: CartridgesPage = open(app).await?;
            if let Some(hunter) = hunter {
                page.select_hunter(app, hunter).await?;
            }
            let start = from.map(timestamp::start_of_day);
            let end = to.map(end_of_day);
            let entries = page.load_history(app, start, end).await?.to_vec();
            let table = page.history_table().unwrap_or_default();
            emit(&table, &entries, format)?;
        }

        Commands::Types => {
            signed_in(app).await?;
            let types = app.client.cartridge_types().await?;
            let mut table = Table::new(["Charge", "Pellet", "Brand", "Id"]);
            for t in &types {
                table.push([
                    t.charge_type.to_string(),
                    t.pellet_size.to_string(),
                    t.brand.clone(),
                    t.id.to_string(),
                ]);
            }
            emit(&table, &types, format)?;
        }

        Commands::Purchase {
            type_id,
            brand,
            charge,
            pellet,
            quantity,
            price,
            date,
            hunter,
        } => {
            let user = signed_in(app).await?;
            let page: CartridgesPage = open(app).await?;
            let mut form = page.purchase_form(app).await?;
            form.hunter_id = hunter.unwrap_or(user.id);
            form.choice = match (type_id, brand) {
                (Some(id), _) => TypeChoice::Existing(id),
                (None, Some(brand)) => TypeChoice::New(NewCartridgeType {
                    charge_type: charge,
                    pellet_size: pellet,
                    brand,
                }),
                (None, None) => TypeChoice::Unselected,
            };
            form.quantity = quantity;
            form.unit_price = price;
            if let Some(date) = date {
                form.purchase_date = date;
            }
            let total = form.total_price();
            let purchase = form.submit(app).await?;
            println!(
                "Bought {} x {} for {}",
                purchase.quantity,
                purchase.cartridge_type.label(),
                render::money(total)
            );
        }

        Commands::Transfer {
            to,
            type_id,
            quantity,
            note,
            date,
        } => {
            let page: CartridgesPage = open(app).await?;
            let mut form = page.transfer_form(app).await?;
            form.to_hunter_id = Some(to);
            form.cartridge_type_id = Some(type_id);
            form.quantity = quantity;
            form.note = note;
            if let Some(date) = date {
                form.transfer_date = date;
            }
            let receipt = form.submit(app).await?;
            println!("{}", receipt.message);
        }

        Commands::Use {
            type_id,
            quantity,
            date,
        } => {
            let user = signed_in(app).await?;
            let mut form = huntclub::forms::UsageForm::load(app, user.id).await?;
            form.cartridge_type_id = Some(type_id);
            form.quantity = quantity;
            if let Some(date) = date {
                form.usage_date = date;
            }
            let usage = form.submit(app).await?;
            println!(
                "Recorded {} x {} used",
                usage.quantity,
                usage.cartridge_type.label()
            );
        }

        Commands::Species { add } => {
            signed_in(app).await?;
            if let Some(name) = add {
                let species = app.client.create_species(name.trim()).await?;
                println!("Added {} ({})", species.name, species.id);
                return Ok(());
            }
            let species = app.client.species().await?;
            let mut table = Table::new(["Species", "Id"]);
            for s in &species {
                table.push([s.name.clone(), s.id.to_string()]);
            }
            emit(&table, &species, format)?;
        }

        Commands::Game { command } => run_game(app, command, format).await?,

        Commands::Stats { season, efficiency } => {
            let mut page: StatsPage = open(app).await?;
            if let Some(year) = season {
                page.select_season(app, year).await?;
            }
            if efficiency {
                page.load_efficiency(app, season).await?;
            }
            show(app, &page, format).await?;
        }

        Commands::Hunters { command } => run_hunters(app, command, format).await?,

        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn run_game(app: &App, command: GameCommand, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        GameCommand::List {
            hunter,
            species,
            season,
        } => {
            let mut page: GamePage = open(app).await?;
            let species_id = match species {
                Some(name) => Some(
                    page.species
                        .iter()
                        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
                        .map(|s| s.id)
                        .with_context(|| format!("Unknown species: {}", name))?,
                ),
                None => None,
            };
            let filter = GameFilter {
                hunter_id: hunter,
                species_id,
                season_year: season,
                ..Default::default()
            };
            if !filter.is_empty() {
                page.apply_filter(app, filter).await?;
            }
            show(app, &page, format).await?;
        }

        GameCommand::Show { id } => {
            signed_in(app).await?;
            let game = app.client.game(id).await?;
            let mut table = Table::new(["Cartridge", "Quantity"]).titled(format!(
                "{} - {}",
                game.species.name,
                render::date(&game.kill_date)
            ));
            for used in &game.game_cartridges {
                table.push([used.cartridge_type.label(), used.quantity.to_string()]);
            }
            if format == OutputFormat::Table {
                println!("Weight: {}", render::or_dash(game.weight.map(|w| format!("{} kg", w))));
                println!("Sex: {}", render::or_dash(game.sex));
                println!("Location: {}", render::or_dash(game.location.as_deref()));
                println!();
            }
            emit(&table, &game, format)?;
        }

        GameCommand::New {
            species,
            date,
            weight,
            sex,
            location,
            cartridges,
        } => {
            let mut page: NewGamePage = open(app).await?;
            let species_id = page
                .species_by_name(&species)
                .map(|s| s.id)
                .with_context(|| format!("Unknown species: {}", species))?;

            page.form.species_id = Some(species_id);
            page.form.weight = weight;
            page.form.sex = sex;
            page.form.location = location;
            if let Some(date) = date {
                page.form.kill_date = date;
            }
            for (i, raw) in cartridges.iter().enumerate() {
                let row = parse_cartridge_row(raw)?;
                let index = if i == 0 { 0 } else { page.form.add_row() };
                page.form.set_row(index, row);
            }

            let submitted = page.submit(app).await?;
            println!(
                "Recorded {} on {} ({} cartridges)",
                submitted.value.species.name,
                render::date(&submitted.value.kill_date),
                submitted.value.cartridges_fired()
            );
        }

        GameCommand::Delete { id } => {
            let mut page: GamePage = open(app).await?;
            page.delete(app, id).await?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

async fn run_hunters(app: &App, command: HunterCommand, format: OutputFormat) -> anyhow::Result<()> {
    let user = signed_in(app).await?;
    if !user.is_admin() {
        bail!("Member administration is reserved to admins");
    }
    let mut page: HuntersPage = open(app).await?;

    match command {
        HunterCommand::List => show(app, &page, format).await?,

        HunterCommand::Add {
            prenom,
            nom,
            email,
            password,
            admin,
        } => {
            let hunter = UserCreate {
                nom,
                prenom,
                email,
                password,
                role: Some(if admin { Role::Admin } else { Role::Hunter }),
            };
            let created = page.create(app, &hunter).await?;
            println!("Added {} ({})", created.display_name(), created.id);
        }

        HunterCommand::Update {
            id,
            prenom,
            nom,
            email,
            password,
            role,
        } => {
            let update = UserUpdate {
                nom,
                prenom,
                email,
                password,
                role,
            };
            if update.is_empty() {
                bail!("Nothing to update");
            }
            let updated = page.update(app, id, &update).await?;
            println!("Updated {}", updated.display_name());
        }

        HunterCommand::Delete { id } => {
            page.delete(app, id).await?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

/// The signed-in member, or an error telling how to sign in
async fn signed_in(app: &App) -> anyhow::Result<User> {
    if guard(app).await.is_some() {
        bail!("Not logged in. Run `huntclub login <email> --password <password>` first");
    }
    app.session
        .current_user()
        .await
        .context("Session has no user")
}

async fn open<P: Page>(app: &App) -> anyhow::Result<P> {
    match visit::<P>(app).await? {
        Visit::Shown(page) => Ok(page),
        Visit::Redirect(route) => bail!(
            "Not logged in (redirected to {}). Run `huntclub login <email> --password <password>` first",
            route
        ),
    }
}

async fn show<P: Page>(app: &App, page: &P, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Table {
        if let Some(user) = app.session.current_user().await {
            println!("{}", Layout::new(user, P::ROUTE).header());
            println!();
        }
    }
    print!("{}", page.output(format)?);
    if format != OutputFormat::Csv {
        println!();
    }
    Ok(())
}

fn emit<T: Serialize + ?Sized>(table: &Table, value: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => println!("{}", table.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Csv => print!("{}", table.to_csv()?),
    }
    Ok(())
}

fn user_table(users: &[User]) -> Table {
    let mut table = Table::new(["Name", "Email", "Role", "Id"]);
    for user in users {
        table.push([
            user.display_name(),
            user.email.clone(),
            user.role.to_string(),
            user.id.to_string(),
        ]);
    }
    table
}

fn end_of_day(date: NaiveDate) -> chrono::DateTime<chrono::Utc> {
    timestamp::start_of_day(date) + chrono::Duration::days(1) - chrono::Duration::seconds(1)
}

/// Parse `TYPE_ID:QUANTITY`
fn parse_cartridge_row(raw: &str) -> anyhow::Result<CartridgeRow> {
    let (id, quantity) = raw
        .split_once(':')
        .with_context(|| format!("Expected TYPE_ID:QUANTITY, got {}", raw))?;
    let id: Uuid = id.trim().parse().with_context(|| format!("Invalid cartridge type id: {}", id))?;
    let quantity: u32 = quantity
        .trim()
        .parse()
        .with_context(|| format!("Invalid quantity: {}", quantity))?;
    Ok(CartridgeRow::new(id, quantity))
}
