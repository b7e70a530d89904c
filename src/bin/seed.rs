//! Seed script - installs the built-in users and master product catalog.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Built-in users overwrite stored users
//! with the same username. Master products are only inserted when their id is
//! absent, so products added or edited through the API survive a re-seed.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

struct SeedUser {
    username: &'static str,
    password: &'static str,
    role: &'static str,
}

struct SeedProduct {
    id: u128,
    name: &'static str,
    barcode: &'static str,
    batch_format: &'static str,
    production_date: (i32, u32, u32),
}

const USERS: &[SeedUser] = &[
    SeedUser {
        username: "admin",
        password: "admin123",
        role: "admin",
    },
    SeedUser {
        username: "staff",
        password: "staff123",
        role: "staff",
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: 0x0001,
        name: "Sparkling Water 500ml",
        barcode: "8901234567890",
        batch_format: "HH:MM NNS",
        production_date: (2026, 1, 12),
    },
    SeedProduct {
        id: 0x0002,
        name: "Orange Juice 1L",
        barcode: "4006381333931",
        batch_format: "NNS11",
        production_date: (2026, 2, 3),
    },
    SeedProduct {
        id: 0x0003,
        name: "Whole Milk 1L",
        barcode: "5012345678900",
        batch_format: "LOT-NNNN HH:MM",
        production_date: (2026, 2, 20),
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")?;
    let pool = batchcheck::db::create_pool(&db_url, 5).await?;
    batchcheck::db::run_migrations(&pool).await?;

    println!("=== Batch Check Seed Script ===");

    seed_users(&pool).await?;
    seed_products(&pool).await?;

    println!("\n=== Seed complete! ===");
    for user in USERS {
        println!("Login: {} / {}", user.username, user.password);
    }

    Ok(())
}

async fn seed_users(pool: &PgPool) -> anyhow::Result<()> {
    for user in USERS {
        let hash = batchcheck::services::auth::hash_password(user.password)?;
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role)
            VALUES ($1, $2, $3, $4::user_role)
            ON CONFLICT (username) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                role = EXCLUDED.role,
                is_active = TRUE,
                updated_at = NOW()
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.username)
        .bind(&hash)
        .bind(user.role)
        .execute(pool)
        .await?;
    }

    println!("[done] Upserted {} users", USERS.len());
    Ok(())
}

async fn seed_products(pool: &PgPool) -> anyhow::Result<()> {
    let mut inserted = 0u64;

    for product in PRODUCTS {
        let (year, month, day) = product.production_date;
        let production_date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| anyhow::anyhow!("invalid production date for {}", product.name))?;

        let result = sqlx::query(
            r#"
            INSERT INTO products (id, product_name, barcode, batch_number_format, production_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::from_u128(product.id))
        .bind(product.name)
        .bind(product.barcode)
        .bind(product.batch_format)
        .bind(production_date)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }

    println!(
        "[done] Inserted {inserted} of {} master products",
        PRODUCTS.len()
    );
    Ok(())
}
