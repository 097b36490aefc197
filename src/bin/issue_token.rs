//! Token provisioning tool
//!
//! Generates a bearer token for an owner and stores its hash.
//! Run with: cargo run --bin issue_token -- --owner <uuid> [--name <label>]

use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let owner_id: uuid::Uuid = args
        .iter()
        .position(|a| a == "--owner")
        .and_then(|i| args.get(i + 1))
        .ok_or_else(|| anyhow::anyhow!("--owner <uuid> is required"))?
        .parse()?;
    let name = args
        .iter()
        .position(|a| a == "--name")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "default".to_string());

    let database_url = std::env::var("DATABASE_URL")?;

    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut token_bytes);
    let token = hex::encode(token_bytes);
    // Same encoding the auth middleware computes in SQL
    let token_hash = hex::encode(Sha256::digest(token.as_bytes()));

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    let token_id = uuid::Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO api_tokens (id, owner_id, name, token_hash, active)
        VALUES ($1, $2, $3, $4, true)
        "#,
    )
    .bind(token_id)
    .bind(owner_id)
    .bind(&name)
    .bind(&token_hash)
    .execute(&pool)
    .await?;

    println!("Token issued for owner {owner_id} ({name})");
    println!("Token id: {token_id}");
    println!();
    println!("  {token}");
    println!();
    println!("The token is shown once and stored only as a hash.");

    Ok(())
}
