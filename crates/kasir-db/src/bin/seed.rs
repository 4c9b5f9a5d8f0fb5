//! # Seed Data Generator
//!
//! Populates a SQLite database with categories and products for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./kasir.db (default)
//! cargo run -p kasir-db --bin seed
//!
//! # Specify database path
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! Everything goes through the repository traits, so the rows look exactly
//! like ones created over HTTP.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use kasir_core::entity::{CategoryEntity, ProductEntity};
use kasir_core::{Currency, DEFAULT_ACTOR};
use kasir_db::{Database, DbConfig, Repositories};

/// Categories with their products: (name, description, [(product, price, stock)])
const CATALOG: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Minuman",
        "Minuman dingin dan panas",
        &[
            ("Teh Botol", 5_000, 48),
            ("Kopi Susu", 18_000, 30),
            ("Air Mineral 600ml", 4_000, 120),
            ("Es Jeruk", 8_000, 25),
        ],
    ),
    (
        "Makanan",
        "Makanan berat",
        &[
            ("Nasi Goreng", 25_000, 20),
            ("Mie Ayam", 20_000, 20),
            ("Soto Ayam", 22_000, 15),
        ],
    ),
    (
        "Cemilan",
        "Makanan ringan",
        &[
            ("Keripik Singkong", 10_000, 40),
            ("Pisang Goreng", 12_000, 18),
            ("Roti Bakar", 15_000, 12),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./kasir.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kasir.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kasir Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let repos = Repositories::sqlite(&db);

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = repos.products.find_all().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    let currency = Currency::default();
    let mut generated = 0;

    for (category_name, description, products) in CATALOG {
        let now = Utc::now();
        let category = repos
            .categories
            .insert(CategoryEntity::new(
                Uuid::now_v7(),
                *category_name,
                *description,
                DEFAULT_ACTOR,
                now,
            ))
            .await?;
        println!("  + {}", category.name);

        for (name, price, stock) in products.iter() {
            let product = ProductEntity {
                id: Uuid::now_v7(),
                name: name.to_string(),
                price: currency.price(*price),
                stock: *stock,
                category_id: Some(category.id),
                category_name: None,
                created_at: now,
                created_by: DEFAULT_ACTOR.to_string(),
                updated_at: now,
                updated_by: DEFAULT_ACTOR.to_string(),
                deleted_at: None,
                version: 1,
            };

            if let Err(e) = repos.products.insert(product).await {
                eprintln!("Failed to insert {}: {}", name, e);
                continue;
            }
            generated += 1;
        }
    }

    println!();
    println!("✓ Generated {} categories and {} products", CATALOG.len(), generated);

    db.close().await;
    Ok(())
}
