//! # Seed Data Generator
//!
//! Creates the first admin account and a sample catalog for development.
//!
//! ## Usage
//! ```bash
//! # Defaults: ./shopfloor.db, admin@shopfloor.local / changeme123
//! cargo run -p shopfloor-db --bin seed
//!
//! # Explicit admin credentials and database
//! cargo run -p shopfloor-db --bin seed -- \
//!     --db ./data/shopfloor.db \
//!     --admin-email ops@example.com \
//!     --admin-password 's3cret-pass'
//! ```
//!
//! Each part is skipped when already present: the admin when its email
//! exists, the catalog when any item exists.

use std::env;

use shopfloor_core::{AuthConfig, CredentialService, NewAccount, NewInventoryItem, Role};
use shopfloor_db::{Database, DbConfig};

/// Sample catalog: (name, description, quantity, price_cents).
const SAMPLE_ITEMS: &[(&str, &str, i64, i64)] = &[
    ("Widget", "General purpose widget", 10, 250),
    ("Gadget", "Battery powered gadget", 25, 1999),
    ("Sprocket", "Steel sprocket, 32 teeth", 100, 475),
    ("Gizmo", "Pocket gizmo", 0, 1250),
    ("Flange", "Stainless flange, 2 inch", 40, 890),
    ("Bracket", "L-bracket, pack of 4", 60, 325),
    ("Hinge", "Brass hinge", 75, 199),
    ("Valve", "Ball valve, 1/2 inch", 15, 2450),
    ("Gear", "Nylon spur gear", 30, 615),
    ("Spring", "Compression spring, pack of 10", 200, 150),
];

const DEFAULT_DB: &str = "./shopfloor.db";
const DEFAULT_ADMIN_EMAIL: &str = "admin@shopfloor.local";
const DEFAULT_ADMIN_PASSWORD: &str = "changeme123";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from(DEFAULT_DB);
    let mut admin_email = String::from(DEFAULT_ADMIN_EMAIL);
    let mut admin_password = String::from(DEFAULT_ADMIN_PASSWORD);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-email" => {
                if i + 1 < args.len() {
                    admin_email = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-password" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shopfloor Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>            Database file path (default: {DEFAULT_DB})");
                println!("      --admin-email <EMAIL>  Admin login (default: {DEFAULT_ADMIN_EMAIL})");
                println!("      --admin-password <PW>  Admin password (default: {DEFAULT_ADMIN_PASSWORD})");
                println!("  -h, --help                 Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("⚠ Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    println!("🌱 Shopfloor Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Hashing never touches the signing key.
    let credentials = CredentialService::new(&AuthConfig::new("seed"))?;

    // Admin account
    println!();
    if db.accounts().get_by_email(&admin_email).await?.is_some() {
        println!("⚠ Admin {} already exists, skipping", admin_email);
    } else {
        let admin = NewAccount {
            email: admin_email.clone(),
            password: admin_password,
            first_name: "Admin".to_string(),
            last_name: None,
            role: Role::Admin,
        }
        .validated()?;

        let created = db.accounts().create(admin, &credentials).await?;
        println!("✓ Created admin {} ({})", created.email, created.id);
    }

    // Catalog
    println!();
    let existing = db.inventory().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping catalog to avoid duplicates.");
    } else {
        println!("Generating items...");

        let mut generated = 0;
        for (name, description, quantity, price_cents) in SAMPLE_ITEMS {
            let item = NewInventoryItem {
                name: name.to_string(),
                description: Some(description.to_string()),
                quantity: *quantity,
                price_cents: *price_cents,
            }
            .validated()?;

            match db.inventory().create(item).await {
                Ok(_) => generated += 1,
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }

        println!("✓ Generated {} items", generated);
    }

    let stats = db.stats().await?;
    println!();
    println!(
        "  {} items, {} units, {} accounts",
        stats.total_items, stats.total_units, stats.total_accounts
    );
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
