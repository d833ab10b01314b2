use pet_shop_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::payments::{BANK_TRANSFER, CASH_ON_DELIVERY, CREDIT_CARD},
    services::password::hash_secret,
};
use uuid::Uuid;

const ORDER_STATUSES: [&str; 9] = [
    "Refunded",
    "Cancelled",
    "On hold",
    "Completed",
    "Processing",
    "Pending",
    "Failed",
    "Pending payment",
    "Checkout draft",
];

const PAYMENT_TYPES: [(&str, &str); 3] = [
    ("Credit card", CREDIT_CARD),
    ("Cash on delivery", CASH_ON_DELIVERY),
    ("Bank transfer", BANK_TRANSFER),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    for title in ORDER_STATUSES {
        ensure_lookup(&pool, "order_statuses", title, &slugify(title)).await?;
    }
    println!("Seeded order statuses");
    for (title, slug) in PAYMENT_TYPES {
        ensure_lookup(&pool, "payment_types", title, slug).await?;
    }
    println!("Seeded payment types");

    let admin_id = ensure_user(&pool, "admin@buckhill.co.uk", "admin", true).await?;
    let marketing_id = ensure_user(&pool, "marketing@buckhill.co.uk", "marketing", false).await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Marketing ID: {marketing_id}");
    Ok(())
}

fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Insert a title/slug lookup row unless the slug already exists. Returns its id.
async fn ensure_lookup(
    pool: &sqlx::PgPool,
    table: &str,
    title: &str,
    slug: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as(&format!("SELECT id FROM {table} WHERE slug = $1"))
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query(&format!("INSERT INTO {table} (id, title, slug) VALUES ($1, $2, $3)"))
        .bind(id)
        .bind(title)
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(id)
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE email = $1 AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        println!("User {email} already present");
        return Ok(id);
    }

    let password_hash = hash_secret(password)?;
    let id = Uuid::new_v4();
    let first_name = if is_admin { "Admin" } else { "Marketing" };
    sqlx::query(
        r#"
        INSERT INTO users
            (id, first_name, last_name, is_admin, email, email_verified_at, password_hash,
             address, phone_number, is_marketing)
        VALUES ($1, $2, 'Buckhill', $3, $4, NOW(), $5, '1 Pet Street, London', '+44 20 7946 0000', $6)
        "#,
    )
    .bind(id)
    .bind(first_name)
    .bind(is_admin)
    .bind(email)
    .bind(password_hash)
    .bind(!is_admin)
    .execute(pool)
    .await?;

    println!("Ensured user {email} (admin={is_admin})");
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let dry_food = ensure_lookup(pool, "categories", "Dry dog food", "dry-dog-food").await?;
    let cat_treats = ensure_lookup(pool, "categories", "Cat treats", "cat-treats").await?;
    let pawsome = ensure_lookup(pool, "brands", "Pawsome", "pawsome").await?;
    let whisker = ensure_lookup(pool, "brands", "Whisker Co", "whisker-co").await?;

    let products = [
        (dry_food, pawsome, "Adult Chicken Kibble 12kg", 4599_i64, "Complete dry food for adult dogs"),
        (dry_food, whisker, "Puppy Salmon Kibble 2kg", 1299, "Grain free food for growing puppies"),
        (cat_treats, whisker, "Tuna Crunchies", 349, "Crunchy tuna treats for cats"),
        (cat_treats, pawsome, "Catnip Pillows", 499, "Soft treats with a catnip centre"),
    ];

    for (category_id, brand_id, title, price, description) in products {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE title = $1 AND deleted_at IS NULL")
                .bind(title)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            continue;
        }
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, brand_id, title, price, description, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, '{}'::jsonb)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category_id)
        .bind(brand_id)
        .bind(title)
        .bind(price)
        .bind(description)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
