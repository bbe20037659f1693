//! Demo data seeding command.
//!
//! Fills an empty database with a believable little barbershop: a
//! service catalog, a handful of masters, a few weeks of orders, and
//! reviews in every moderation state. Staff accounts are left alone;
//! create those with `cj-cli staff create`.
//!
//! # Usage
//!
//! ```bash
//! cj-cli seed          # refuses to touch a non-empty database
//! cj-cli seed --force  # wipes shop data first (keeps staff accounts)
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use chrono::{Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use clipjoint_core::{OrderStatus, ReviewStatus};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The database already has catalog rows.
    #[error("Database already has catalog data; re-run with --force to replace it")]
    NotEmpty,
}

/// Name, description, price in kopecks, duration, popular flag.
const SERVICES: [(&str, Option<&str>, i64, i32, bool); 7] = [
    (
        "Classic cut",
        Some("Scissor cut, wash and styling."),
        70_000,
        45,
        true,
    ),
    (
        "Skin fade",
        Some("Clipper fade down to the skin, blended by hand."),
        95_000,
        60,
        true,
    ),
    ("Beard trim", Some("Shape-up with hot towel finish."), 45_000, 30, false),
    (
        "Royal shave",
        Some("Straight razor shave with pre-shave oil."),
        85_000,
        40,
        false,
    ),
    (
        "Cut + beard combo",
        Some("Full haircut and beard service in one sitting."),
        140_000,
        90,
        true,
    ),
    ("Kids cut", Some("For gentlemen under twelve."), 50_000, 30, false),
    ("Gray blending", None, 120_000, 60, false),
];

/// Name, phone, years of experience, active flag, offered service indexes.
const MASTERS: [(&str, &str, i32, bool, &[usize]); 5] = [
    ("Viktor Baranov", "+7 901 111-22-33", 12, true, &[0, 1, 2, 3, 4]),
    ("Denis Kolesov", "+7 902 222-33-44", 7, true, &[0, 1, 4, 5]),
    ("Artur Minasyan", "+7 903 333-44-55", 4, true, &[0, 2, 3, 5]),
    ("Pavel Zhuk", "+7 904 444-55-66", 9, true, &[1, 4, 6]),
    ("Semyon Orlov", "+7 905 555-66-77", 15, false, &[0, 1, 2, 3, 4, 5, 6]),
];

const CUSTOMERS: [&str; 12] = [
    "Ivan Petrov",
    "Oleg Sidorov",
    "Maria Volkova",
    "Nikita Smirnov",
    "Andrey Kuznetsov",
    "Sergey Popov",
    "Dmitry Lebedev",
    "Anna Kozlova",
    "Egor Novikov",
    "Timur Akhmetov",
    "Kirill Morozov",
    "Alexey Pavlov",
];

const COMMENTS: [&str; 5] = [
    "Running 10 minutes late, please wait for me.",
    "Same as last time please.",
    "First visit, a friend recommended you.",
    "Would like the earliest slot that day.",
    "Please keep the length on top.",
];

/// Weighted so lists show a realistic status mix.
const ORDER_STATUSES: [OrderStatus; 9] = [
    OrderStatus::New,
    OrderStatus::New,
    OrderStatus::New,
    OrderStatus::Confirmed,
    OrderStatus::Confirmed,
    OrderStatus::Completed,
    OrderStatus::Completed,
    OrderStatus::Completed,
    OrderStatus::Canceled,
];

const REVIEW_AUTHORS: [&str; 8] = [
    "Ivan P.", "Oleg", "Nikita", "Andrey K.", "Sergey", "Dmitry", "Egor", "Timur",
];

const REVIEW_BODIES: [&str; 8] = [
    "Best fade in town, I keep coming back.",
    "Quick, careful, and the hot towel is a nice touch.",
    "Showed a photo, got exactly that. Rare thing.",
    "Good cut but I had to wait past my slot.",
    "The beard trim alone is worth the trip.",
    "My son actually enjoys haircuts now.",
    "Solid work, fair price.",
    "Walked out looking sharper than my suit.",
];

const RATINGS: [i16; 6] = [5, 5, 5, 4, 4, 3];

/// Weighted toward visible states so the public site has content.
const REVIEW_STATUSES: [ReviewStatus; 8] = [
    ReviewStatus::Published,
    ReviewStatus::Published,
    ReviewStatus::Published,
    ReviewStatus::AiApproved,
    ReviewStatus::AiApproved,
    ReviewStatus::Pending,
    ReviewStatus::Pending,
    ReviewStatus::AiRejected,
];

/// Seed the database with demo data.
///
/// # Errors
///
/// Returns [`SeedError::NotEmpty`] if the catalog already has rows and
/// `force` is not set, or a database error.
pub async fn run(force: bool) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.services")
        .fetch_one(&pool)
        .await?;

    if existing > 0 {
        if !force {
            return Err(SeedError::NotEmpty);
        }
        tracing::warn!("Clearing existing shop data (staff accounts kept)");
        sqlx::query(
            "TRUNCATE shop.order_services, shop.orders, shop.reviews, \
             shop.master_services, shop.masters, shop.services \
             RESTART IDENTITY CASCADE",
        )
        .execute(&pool)
        .await?;
    }

    let service_ids = seed_services(&pool).await?;
    let masters = seed_masters(&pool, &service_ids).await?;
    let orders = seed_orders(&pool, &masters, &service_ids).await?;
    let reviews = seed_reviews(&pool, &masters).await?;

    tracing::info!(
        services = service_ids.len(),
        masters = masters.len(),
        orders,
        reviews,
        "Seed complete"
    );
    Ok(())
}

/// Insert the service catalog, returning ids in [`SERVICES`] order.
async fn seed_services(pool: &PgPool) -> Result<Vec<i32>, SeedError> {
    let mut ids = Vec::with_capacity(SERVICES.len());
    for (name, description, kopecks, minutes, popular) in SERVICES {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.services (name, description, price, duration_minutes, is_popular)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(description)
        .bind(Decimal::new(kopecks, 2))
        .bind(minutes)
        .bind(popular)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

/// A seeded master: id plus the service ids they offer.
struct SeededMaster {
    id: i32,
    offered: Vec<i32>,
}

async fn seed_masters(pool: &PgPool, service_ids: &[i32]) -> Result<Vec<SeededMaster>, SeedError> {
    let mut out = Vec::with_capacity(MASTERS.len());
    for (name, phone, years, active, offered_idx) in MASTERS {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.masters (name, phone, experience_years, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(phone)
        .bind(years)
        .bind(active)
        .fetch_one(pool)
        .await?;

        let offered: Vec<i32> = offered_idx
            .iter()
            .filter_map(|&i| service_ids.get(i))
            .copied()
            .collect();
        sqlx::query(
            r"
            INSERT INTO shop.master_services (master_id, service_id)
            SELECT $1, UNNEST($2::int4[])
            ",
        )
        .bind(id)
        .bind(&offered)
        .execute(pool)
        .await?;

        out.push(SeededMaster { id, offered });
    }
    Ok(out)
}

async fn seed_orders(
    pool: &PgPool,
    masters: &[SeededMaster],
    service_ids: &[i32],
) -> Result<usize, SeedError> {
    let mut rng = rand::rng();
    let count = 20;

    for _ in 0..count {
        let customer = CUSTOMERS.choose(&mut rng).copied().unwrap_or("Walk-in");
        let phone = format!(
            "+7 9{:02} {:03}-{:02}-{:02}",
            rng.random_range(0..=99),
            rng.random_range(0..=999),
            rng.random_range(0..=99),
            rng.random_range(0..=99),
        );
        let comment = if rng.random_bool(0.4) {
            COMMENTS.choose(&mut rng).copied()
        } else {
            None
        };
        let status = ORDER_STATUSES
            .choose(&mut rng)
            .copied()
            .unwrap_or(OrderStatus::New);

        // Most orders name a master; their services must come from that
        // master's offered set.
        let master = if rng.random_bool(0.8) {
            masters.choose(&mut rng)
        } else {
            None
        };
        let pool_of_services = master.map_or(service_ids, |m| m.offered.as_slice());
        let picked = rng.random_range(1..=pool_of_services.len().min(3));
        let services: Vec<i32> = pool_of_services
            .choose_multiple(&mut rng, picked)
            .copied()
            .collect();

        let appointment = if rng.random_bool(0.85) {
            Some(Utc::now().date_naive() + Duration::days(rng.random_range(-10..=20)))
        } else {
            None
        };
        let placed_days_ago = rng.random_range(0..=30);

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.orders
                (customer_name, phone, comment, status, master_id, appointment_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW() - make_interval(days => $7))
            RETURNING id
            ",
        )
        .bind(customer)
        .bind(&phone)
        .bind(comment)
        .bind(status.as_str())
        .bind(master.map(|m| m.id))
        .bind(appointment)
        .bind(placed_days_ago)
        .fetch_one(pool)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.order_services (order_id, service_id)
            SELECT $1, UNNEST($2::int4[])
            ",
        )
        .bind(order_id)
        .bind(&services)
        .execute(pool)
        .await?;
    }

    Ok(count)
}

async fn seed_reviews(pool: &PgPool, masters: &[SeededMaster]) -> Result<usize, SeedError> {
    let mut rng = rand::rng();
    let mut total = 0;

    for master in masters {
        for _ in 0..rng.random_range(0..=5) {
            let author = REVIEW_AUTHORS.choose(&mut rng).copied().unwrap_or("A customer");
            let body = REVIEW_BODIES
                .choose(&mut rng)
                .copied()
                .unwrap_or("Good haircut.");
            let rating = RATINGS.choose(&mut rng).copied().unwrap_or(5);
            let status = REVIEW_STATUSES
                .choose(&mut rng)
                .copied()
                .unwrap_or(ReviewStatus::Pending);

            sqlx::query(
                r"
                INSERT INTO shop.reviews (master_id, author_name, body, rating, status, created_at)
                VALUES ($1, $2, $3, $4, $5, NOW() - make_interval(days => $6))
                ",
            )
            .bind(master.id)
            .bind(author)
            .bind(body)
            .bind(rating)
            .bind(status.as_str())
            .bind(rng.random_range(0..=60))
            .execute(pool)
            .await?;
            total += 1;
        }
    }

    Ok(total)
}
