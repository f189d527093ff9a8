// Script that replays the reference session against a fresh database
// Run with: cargo run --bin seed-demo [-- path/to/demo.db [normalized|denormalized]]

use client_book_lib::commands;
use client_book_lib::config::OutputFormat;
use client_book_lib::db::ClientStore;
use client_book_lib::models::{ClientFilter, ClientPatch, SchemaVariant};
use client_book_lib::output::emit;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(|| ":memory:".to_string());
    let variant = match args.next() {
        Some(name) => SchemaVariant::parse(&name).ok_or(format!("unknown layout: {}", name))?,
        None => SchemaVariant::Normalized,
    };

    // Remove existing if present
    let file = PathBuf::from(&db_path);
    if db_path != ":memory:" && file.exists() {
        std::fs::remove_file(&file)?;
    }

    let mut store = ClientStore::open(&db_path, variant)?;
    let format = OutputFormat::Text;

    emit(&commands::initialize(&store), format)?;

    let people = [
        ("Maxim", "Rochev", "ololo@mail.ru", Some("88005555535")),
        ("Polina", "Skiba", "polasha@mail.ru", None),
        ("Dmitriy", "Semenov", "chilliburher@mail.ru", Some("89113524000")),
        ("Dmitriy", "Demetyev", "balda@yandex.ru", Some("89123531254")),
    ];
    for (name, surname, email, phone) in people {
        let response = commands::add_client(
            &mut store,
            name.to_string(),
            surname.to_string(),
            email.to_string(),
            phone.map(str::to_string),
        );
        emit(&response, format)?;
    }
    emit(&commands::list_clients(&store), format)?;

    emit(&commands::add_phone(&mut store, 2, "8991676553242".to_string()), format)?;
    emit(&commands::get_phones(&store, 2), format)?;

    let patch = ClientPatch {
        name: Some("Dimka".to_string()),
        surname: Some("Dimontiev".to_string()),
        ..Default::default()
    };
    emit(&commands::update_client(&mut store, 4, patch), format)?;

    emit(&commands::delete_phone(&mut store, 1, "88005555535".to_string()), format)?;
    emit(&commands::get_phones(&store, 1), format)?;

    emit(&commands::delete_client(&mut store, 3), format)?;
    emit(&commands::get_client(&store, 3), format)?;

    emit(&commands::find_clients(&store, ClientFilter::by_name("Dmitriy")), format)?;

    if db_path != ":memory:" {
        println!("Demo database written to: {}", file.display());
    }
    Ok(())
}
