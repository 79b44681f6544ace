//! Catalog seeding command.
//!
//! # Usage
//!
//! ```bash
//! juniper-cli seed
//! ```
//!
//! Inserts a small sample catalog for local development. Refuses to run
//! against a non-empty `product` table so it can never pollute real
//! data.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::{CommandError, database_url};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    category: &'static str,
    is_featured: bool,
}

fn sample_catalog() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Walnut Serving Board",
            description: "End-grain walnut board, food-safe oil finish.",
            price: Decimal::new(4999, 2),
            category: "kitchen",
            is_featured: true,
        },
        SeedProduct {
            name: "Stoneware Mug",
            description: "Hand-thrown 12oz mug with matte glaze.",
            price: Decimal::new(2400, 2),
            category: "kitchen",
            is_featured: false,
        },
        SeedProduct {
            name: "Linen Throw Blanket",
            description: "Stonewashed linen, 130x180cm.",
            price: Decimal::new(8900, 2),
            category: "home",
            is_featured: true,
        },
        SeedProduct {
            name: "Brass Desk Lamp",
            description: "Adjustable arm, solid brass, E14 socket.",
            price: Decimal::new(12500, 2),
            category: "home",
            is_featured: false,
        },
        SeedProduct {
            name: "Canvas Weekender Bag",
            description: "Waxed canvas with leather trim and brass hardware.",
            price: Decimal::new(14900, 2),
            category: "travel",
            is_featured: true,
        },
        SeedProduct {
            name: "Field Notebook Set",
            description: "Three pocket notebooks, dot grid, recycled paper.",
            price: Decimal::new(1250, 2),
            category: "stationery",
            is_featured: false,
        },
    ]
}

/// Seed the catalog with sample products.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the insert
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product")
        .fetch_one(&pool)
        .await?;

    if existing > 0 {
        tracing::warn!("Product table already has {} rows, skipping seed", existing);
        return Ok(());
    }

    let catalog = sample_catalog();
    for product in &catalog {
        sqlx::query(
            "INSERT INTO product (name, description, price, category, is_featured)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.category)
        .bind(product.is_featured)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeded {} products", catalog.len());
    Ok(())
}
