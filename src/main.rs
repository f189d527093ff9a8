// ABOUTME: Entry point for the client-book command line tool
// ABOUTME: Parses arguments, loads config, opens the store and prints one command's result

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use client_book_lib::commands;
use client_book_lib::config::{AppConfig, OutputFormat};
use client_book_lib::db::ClientStore;
use client_book_lib::models::{ClientFilter, ClientPatch, SchemaVariant};
use client_book_lib::output::emit;

#[derive(Parser, Debug)]
#[command(name = "client-book")]
#[command(version)]
#[command(about = "Manage clients and their phone numbers in a SQLite database")]
struct Args {
    /// Config file (defaults to the per-user config location)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database file path, or :memory:
    #[arg(short, long, value_name = "PATH")]
    database: Option<String>,

    /// Table layout
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Normalized,
    Denormalized,
}

impl From<VariantArg> for SchemaVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Normalized => SchemaVariant::Normalized,
            VariantArg::Denormalized => SchemaVariant::Denormalized,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the tables if they do not exist
    Init,
    /// Add a client
    Add {
        name: String,
        surname: String,
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Attach a phone number to a client
    AddPhone { id: i64, number: String },
    /// Change only the given fields of a client
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        surname: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a client and its phone numbers
    Delete { id: i64 },
    /// Remove a phone number from a client
    DeletePhone { id: i64, number: String },
    /// Find clients matching all given fields
    Find {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        surname: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show one client
    Show { id: i64 },
    /// List the phone numbers of a client
    Phones { id: i64 },
    /// List all clients
    List,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("could not load config file: {}", e);
            AppConfig::default()
        }),
    };

    config.apply_overrides(
        args.database,
        args.variant.map(Into::into),
        args.format.map(Into::into),
    );

    let mut store = ClientStore::open(&config.database.path, config.database.variant)
        .with_context(|| format!("opening database {}", config.database.path))?;
    let format = config.preferences.output_format;

    let code = match args.command {
        Command::Init => emit(&commands::initialize(&store), format)?,
        Command::Add {
            name,
            surname,
            email,
            phone,
        } => emit(
            &commands::add_client(&mut store, name, surname, email, phone),
            format,
        )?,
        Command::AddPhone { id, number } => {
            emit(&commands::add_phone(&mut store, id, number), format)?
        }
        Command::Update {
            id,
            name,
            surname,
            email,
            phone,
        } => {
            let patch = ClientPatch {
                name,
                surname,
                email,
                phone,
            };
            emit(&commands::update_client(&mut store, id, patch), format)?
        }
        Command::Delete { id } => emit(&commands::delete_client(&mut store, id), format)?,
        Command::DeletePhone { id, number } => {
            emit(&commands::delete_phone(&mut store, id, number), format)?
        }
        Command::Find {
            name,
            surname,
            email,
            phone,
        } => {
            let filter = ClientFilter {
                name,
                surname,
                email,
                phone,
            };
            emit(&commands::find_clients(&store, filter), format)?
        }
        Command::Show { id } => emit(&commands::get_client(&store, id), format)?,
        Command::Phones { id } => emit(&commands::get_phones(&store, id), format)?,
        Command::List => emit(&commands::list_clients(&store), format)?,
    };

    Ok(ExitCode::from(code))
}
