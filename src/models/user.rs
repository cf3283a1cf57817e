//! User account model: credit balance, premium status, payment history.

use crate::models::Plan;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// User account stored in Firestore (collection `user_data`, document id =
/// the identity provider's uid).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable, opaque identifier from the identity provider
    pub uid: String,
    /// Display name from the identity provider profile
    pub display_name: Option<String>,
    /// Profile photo URL
    pub photo_url: Option<String>,
    /// Credit balance; one credit per successful analysis
    pub credits: u32,
    /// Whether a paid plan is active
    pub is_premium: bool,
    /// Active plan id, if any
    pub plan_id: Option<String>,
    /// When the active plan expires
    pub expire_date: Option<DateTime<Utc>>,
    /// Last captured order
    pub payment_info: Option<PaymentInfo>,
    /// PayPal order ids already applied to this account. A capture callback
    /// delivered twice must not credit the balance twice.
    #[serde(default)]
    pub applied_order_ids: Vec<String>,
    /// When the record was first created
    pub created_at: DateTime<Utc>,
}

/// Record of the last captured payment order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub order_id: String,
    pub plan_id: String,
    pub amount: f64,
    pub captured_at: DateTime<Utc>,
}

/// Why a spend attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendError {
    Insufficient,
}

impl User {
    /// Create a fresh account seeded from identity-provider profile data.
    pub fn new(
        uid: String,
        display_name: Option<String>,
        photo_url: Option<String>,
        initial_credits: u32,
    ) -> Self {
        Self {
            uid,
            display_name,
            photo_url,
            credits: initial_credits,
            is_premium: false,
            plan_id: None,
            expire_date: None,
            payment_info: None,
            applied_order_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Deduct `amount` credits, refusing rather than underflowing.
    ///
    /// Returns the new balance. The caller must run this inside a Firestore
    /// transaction so the check and the write are a single atomic step.
    pub fn try_spend(&mut self, amount: u32) -> Result<u32, SpendError> {
        if self.credits < amount {
            return Err(SpendError::Insufficient);
        }
        self.credits -= amount;
        Ok(self.credits)
    }

    /// Apply a completed payment capture for `plan`.
    ///
    /// Returns `false` without mutating anything when this order id has
    /// already been applied (replayed capture callback). Otherwise marks the
    /// account premium, extends the expiry from `now`, records the payment,
    /// and grants the plan's credit allotment.
    pub fn apply_capture(
        &mut self,
        plan: &Plan,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if self.applied_order_ids.iter().any(|id| id == order_id) {
            return false;
        }

        self.is_premium = true;
        self.plan_id = Some(plan.plan_id.clone());
        self.expire_date = Some(now + Duration::days(plan.duration_days));
        self.payment_info = Some(PaymentInfo {
            order_id: order_id.to_string(),
            plan_id: plan.plan_id.clone(),
            amount: plan.price,
            captured_at: now,
        });
        self.applied_order_ids.push(order_id.to_string());
        self.credits = self.credits.saturating_add(plan.image_credits);
        true
    }
}
