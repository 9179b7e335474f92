//! # Seed Data Generator
//!
//! Populates the database with a small café catalog for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! Seeds three collections:
//! - stock items (raw inventory in sub-units: grams, millilitres, pieces)
//! - products (the sellable menu)
//! - depletion mappings (how much stock one sale of each product consumes)

use std::env;

use tally_core::{Depletion, Product, StockItem};
use tally_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// item_id, description, unit_name, sub_unit_count, total_units
const STOCK_ITEMS: &[(&str, &str, &str, f64, f64)] = &[
    ("beans", "Arabica espresso beans", "gram", 1000.0, 5000.0),
    ("milk", "Whole milk", "millilitre", 1000.0, 8000.0),
    ("oat-milk", "Oat drink", "millilitre", 1000.0, 2000.0),
    ("cups-s", "Small takeaway cups", "cup", 50.0, 400.0),
    ("cups-l", "Large takeaway cups", "cup", 50.0, 250.0),
    ("choc", "Drinking chocolate", "gram", 500.0, 1500.0),
    ("syrup", "Vanilla syrup", "millilitre", 700.0, 700.0),
];

/// id, name, category, price, [(stock item, sub-units per sale)]
const PRODUCTS: &[(&str, &str, &str, f64, &[(&str, f64)])] = &[
    (
        "p-espresso",
        "Espresso",
        "Coffee",
        2.8,
        &[("beans", 18.0), ("cups-s", 1.0)],
    ),
    (
        "p-flat-white",
        "Flat White",
        "Coffee",
        3.9,
        &[("beans", 18.0), ("milk", 160.0), ("cups-s", 1.0)],
    ),
    (
        "p-latte",
        "Caffe Latte",
        "Coffee",
        4.2,
        &[("beans", 18.0), ("milk", 220.0), ("cups-l", 1.0)],
    ),
    (
        "p-oat-latte",
        "Oat Latte",
        "Coffee",
        4.6,
        &[("beans", 18.0), ("oat-milk", 220.0), ("cups-l", 1.0)],
    ),
    (
        "p-hot-choc",
        "Hot Chocolate",
        "Other",
        3.6,
        &[("choc", 30.0), ("milk", 220.0), ("cups-l", 1.0)],
    ),
    (
        "p-vanilla-latte",
        "Vanilla Latte",
        "Coffee",
        4.7,
        &[("beans", 18.0), ("milk", 220.0), ("syrup", 15.0), ("cups-l", 1.0)],
    ),
    // Informational entry with no stock links: never sellable on purpose.
    ("p-gift-card", "Gift Card", "Other", 10.0, &[]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./tally_dev.db");

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
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tally POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("* Connected to database");
    println!("* Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("! Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding stock items...");
    for &(item_id, description, unit_name, sub_unit_count, total_units) in STOCK_ITEMS {
        let item = StockItem {
            item_id: item_id.to_string(),
            description: description.to_string(),
            quantity: total_units / sub_unit_count,
            sub_unit_count,
            unit_name: unit_name.to_string(),
            total_units,
        };
        db.stock_items().put(&item).await?;
    }
    println!("* {} stock items", STOCK_ITEMS.len());

    println!("Seeding products and depletion mappings...");
    let mut mappings = 0usize;
    for &(id, name, category, price, links) in PRODUCTS {
        let product = Product {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price,
            description: String::new(),
        };
        db.products().put(&product).await?;

        for &(stock_item_id, rate) in links {
            db.depletions()
                .put(&Depletion {
                    product_id: id.to_string(),
                    stock_item_id: stock_item_id.to_string(),
                    depletion_quantity: rate,
                })
                .await?;
            mappings += 1;
        }
    }
    println!("* {} products, {} depletion mappings", PRODUCTS.len(), mappings);

    println!();
    println!(
        "Seed complete at {}.",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    Ok(())
}
