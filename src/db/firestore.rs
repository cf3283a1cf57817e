// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (account records with credit balances)
//! - Plans (read-only catalog)
//! - The credit ledger (transactional check-and-decrement, payment capture)

use crate::db::collections;
use crate::error::AppError;
use crate::models::user::SpendError;
use crate::models::{Plan, User};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user account by uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user account.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a user account, creating it on first access.
    ///
    /// Records are seeded idempotently from identity-provider profile data;
    /// the uid is the sole lookup key.
    pub async fn get_or_create_user(
        &self,
        uid: &str,
        display_name: Option<String>,
        photo_url: Option<String>,
        initial_credits: u32,
    ) -> Result<User, AppError> {
        if let Some(user) = self.get_user(uid).await? {
            return Ok(user);
        }

        let user = User::new(uid.to_string(), display_name, photo_url, initial_credits);
        self.upsert_user(&user).await?;
        tracing::info!(uid, initial_credits, "Created user account");
        Ok(user)
    }

    // ─── Credit Ledger ───────────────────────────────────────────

    /// Atomically deduct `amount` credits from a user.
    ///
    /// The read and the decremented write happen inside one Firestore
    /// transaction, so two concurrent requests cannot both pass the balance
    /// check: the losing commit conflicts and no balance ever goes negative.
    ///
    /// Returns the new balance.
    pub async fn deduct_credits(&self, uid: &str, amount: u32) -> Result<u32, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read the account within the transaction for conflict detection
        let user: Option<User> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read user in transaction: {}", e)))?;

        let mut user = match user {
            Some(user) => user,
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!("User {} not found", uid)));
            }
        };

        let new_balance = match user.try_spend(amount) {
            Ok(balance) => balance,
            Err(SpendError::Insufficient) => {
                // No mutation on refusal
                let _ = transaction.rollback().await;
                return Err(AppError::InsufficientCredits);
            }
        };

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(uid)
            .object(&user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deduction to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(uid, amount, new_balance, "Credits deducted");
        Ok(new_balance)
    }

    /// Apply a completed payment capture to a user account, at most once per
    /// PayPal order id.
    ///
    /// Returns `false` if this order was already applied (replayed capture
    /// callback) and the account was left untouched. Creates the account if
    /// it does not exist yet, matching the original upsert behavior.
    pub async fn credit_capture(
        &self,
        uid: &str,
        plan: &Plan,
        order_id: &str,
    ) -> Result<bool, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let user: Option<User> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read user in transaction: {}", e)))?;

        let mut user =
            user.unwrap_or_else(|| User::new(uid.to_string(), None, None, 0));

        let applied = user.apply_capture(plan, order_id, chrono::Utc::now());
        if !applied {
            tracing::info!(uid, order_id, "Order already applied (idempotent skip)");
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(uid)
            .object(&user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add capture to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            uid,
            order_id,
            plan_id = %plan.plan_id,
            credits_granted = plan.image_credits,
            "Payment capture applied"
        );

        Ok(true)
    }

    // ─── Plan Catalog ────────────────────────────────────────────

    /// Fetch the whole plan catalog.
    pub async fn list_plans(&self) -> Result<Vec<Plan>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PLANS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a plan by id, case-insensitively.
    pub async fn find_plan(&self, plan_id: &str) -> Result<Option<Plan>, AppError> {
        let plans = self.list_plans().await?;
        Ok(crate::models::plan::find_plan(&plans, plan_id).cloned())
    }
}
