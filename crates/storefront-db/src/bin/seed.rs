//! # Seed Data Generator
//!
//! Populates the catalog with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default) into ./storefront.db
//! cargo run -p storefront-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p storefront-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! Each product has a category, a price between $4.99 and $104.98, and a
//! stock level between 0 and 100.

use std::env;

use storefront_core::{Money, Pagination, ProductDraft, ProductFilter};
use storefront_db::migrations::migration_status;
use storefront_db::{Database, DbConfig};

/// Product categories for realistic demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Electronics",
        &[
            "Wireless Headphones",
            "USB-C Charger",
            "Bluetooth Speaker",
            "Mechanical Keyboard",
            "Webcam",
            "Portable SSD",
        ],
    ),
    (
        "Books",
        &[
            "Rust in Action",
            "The Pragmatic Programmer",
            "Designing Data-Intensive Applications",
            "Clean Architecture",
        ],
    ),
    (
        "Home",
        &[
            "Ceramic Mug",
            "French Press",
            "Desk Lamp",
            "Throw Blanket",
            "Plant Pot",
        ],
    ),
    (
        "Clothing",
        &["Cotton T-Shirt", "Hoodie", "Running Socks", "Baseball Cap"],
    ),
];

/// Variants multiply the catalog so larger counts stay realistic
const VARIANTS: &[(&str, i64)] = &[
    ("", 0),
    ("Black", 0),
    ("White", 100),
    ("Deluxe", 2500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./storefront.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::from_url(&db_path)).await?;

    let (total, applied) = migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    'outer: for (variant_idx, (variant, price_addon)) in VARIANTS.iter().enumerate() {
        for (category_idx, (category, names)) in CATEGORIES.iter().enumerate() {
            for (name_idx, name) in names.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = variant_idx * 100 + category_idx * 10 + name_idx;
                let draft = generate_product(category, name, variant, *price_addon, seed);

                if let Err(e) = db.products().create(draft).await {
                    eprintln!("Failed to insert {}: {}", name, e);
                    continue;
                }

                generated += 1;
            }
        }
    }

    println!("✓ Generated {} products", generated);

    let electronics = ProductFilter {
        category: Some("Electronics".to_string()),
    };
    let sample = db.products().list(&electronics, Pagination::default()).await?;
    println!("  Category 'Electronics': {} products", sample.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Builds a single product draft with deterministic demo data.
fn generate_product(
    category: &str,
    name: &str,
    variant: &str,
    price_addon: i64,
    seed: usize,
) -> ProductDraft {
    // $4.99 - $79.99 + variant addon
    let base_price = 499 + ((seed * 37) % 7500) as i64;

    let full_name = if variant.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, variant)
    };

    ProductDraft {
        name: full_name,
        description: Some(format!("{} from our {} range", name, category.to_lowercase())),
        price: Money::from_cents(base_price + price_addon),
        stock: (seed % 101) as i64,
        category: Some(category.to_string()),
        image_url: None,
    }
}
