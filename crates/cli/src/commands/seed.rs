//! Seed the database with demo data.
//!
//! Creates an admin, a store owner, and a clerk, two stores, a grant for
//! the clerk, and a handful of transactions so a fresh environment has
//! something to look at.
//!
//! Users keep fixed IDs, so re-running refreshes their profiles instead of
//! duplicating them; stores are only created when the owner has none yet.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use ledgerflow_api::models::{NewGrant, NewStore, NewTransaction, UpsertUser};
use ledgerflow_api::storage::{PgStorage, Storage};
use ledgerflow_core::{Amount, Email, Role, StoreRole, UserId};

const ADMIN_ID: Uuid = Uuid::from_u128(0xA11C_E000_0000_4000_8000_0000_0000_0001);
const OWNER_ID: Uuid = Uuid::from_u128(0xA11C_E000_0000_4000_8000_0000_0000_0002);
const CLERK_ID: Uuid = Uuid::from_u128(0xA11C_E000_0000_4000_8000_0000_0000_0003);

/// Seed demo users, stores, and transactions.
///
/// # Errors
///
/// Returns an error if environment variables are missing or database
/// operations fail.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("LEDGERFLOW_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "LEDGERFLOW_DATABASE_URL not set")?;

    let pool = PgPool::connect(&database_url).await?;
    let storage = PgStorage::new(pool);

    info!("Seeding demo users");
    let admin = storage
        .upsert_user(demo_user(ADMIN_ID, "admin@example.com", "Ada", Some(Role::Admin))?)
        .await?;
    let owner = storage
        .upsert_user(demo_user(OWNER_ID, "owner@example.com", "Omar", None)?)
        .await?;
    let clerk = storage
        .upsert_user(demo_user(CLERK_ID, "clerk@example.com", "Cleo", Some(Role::Clerk))?)
        .await?;
    info!("Demo users ready: {}, {}, {}", admin.email, owner.email, clerk.email);

    if !storage.list_stores_owned_by(owner.id).await?.is_empty() {
        info!("Demo stores already present, skipping");
        return Ok(());
    }

    info!("Seeding demo stores");
    let corner_shop = storage
        .create_store(NewStore {
            name: "Corner Shop".to_owned(),
            description: Some("Neighborhood grocery, cash only".to_owned()),
            owner_id: owner.id,
        })
        .await?;
    let harbor_kiosk = storage
        .create_store(NewStore {
            name: "Harbor Kiosk".to_owned(),
            description: None,
            owner_id: owner.id,
        })
        .await?;

    info!("Granting clerk access to {}", corner_shop.name);
    storage
        .create_grant(NewGrant {
            store_id: corner_shop.id,
            user_id: clerk.id,
            role_in_store: StoreRole::Clerk,
        })
        .await?;

    info!("Seeding demo transactions");
    let entries = [
        (&corner_shop, 9, "1200.00", "200.00", Some("Opening stock")),
        (&corner_shop, 5, "450.50", "0.00", None),
        (&corner_shop, 1, "89.99", "9.99", Some("Weekend top-up")),
        (&harbor_kiosk, 3, "310.00", "35.00", Some("Ferry season prep")),
        (&harbor_kiosk, 2, "75.25", "0.00", None),
    ];
    for (store, days_ago, supplied, remaining, notes) in entries {
        storage
            .create_transaction(NewTransaction {
                store_id: store.id,
                date: Utc::now() - Duration::days(days_ago),
                amount_supplied: Amount::parse(supplied)?,
                amount_remaining: Amount::parse(remaining)?,
                notes: notes.map(ToOwned::to_owned),
                created_by: clerk.id,
            })
            .await?;
    }

    info!("Seed complete!");
    Ok(())
}

fn demo_user(
    id: Uuid,
    email: &str,
    first_name: &str,
    role: Option<Role>,
) -> Result<UpsertUser, ledgerflow_core::EmailError> {
    Ok(UpsertUser {
        id: Some(UserId::new(id)),
        email: Email::parse(email)?,
        first_name: Some(first_name.to_owned()),
        last_name: Some("Demo".to_owned()),
        profile_image_url: None,
        role,
    })
}
