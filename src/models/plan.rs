//! Subscription plan catalog model.

use serde::{Deserialize, Serialize};

/// A purchasable plan. Read-only reference data seeded out-of-band
/// (see `demos/seed_plans.json`); never mutated at request time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Catalog key, e.g. "Free Trial", "Basic", "Standard", "Premium"
    pub plan_id: String,
    /// Price in USD
    pub price: f64,
    /// Plan validity in days
    #[serde(default = "default_duration_days")]
    pub duration_days: i64,
    /// Credits granted on purchase
    #[serde(default)]
    pub image_credits: u32,
    /// Marketing feature list, ordered
    #[serde(default)]
    pub features: Vec<String>,
}

fn default_duration_days() -> i64 {
    30
}

/// Find a plan by id, case-insensitively.
///
/// Firestore has no case-insensitive query, so the caller fetches the whole
/// (tiny) catalog and matches here.
pub fn find_plan<'a>(plans: &'a [Plan], plan_id: &str) -> Option<&'a Plan> {
    plans
        .iter()
        .find(|p| p.plan_id.eq_ignore_ascii_case(plan_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Plan> {
        ["Free Trial", "Basic", "Standard", "Premium"]
            .iter()
            .map(|name| Plan {
                plan_id: name.to_string(),
                price: 5.0,
                duration_days: 30,
                image_credits: 1000,
                features: vec![],
            })
            .collect()
    }

    #[test]
    fn test_find_plan_case_insensitive() {
        let plans = catalog();
        assert!(find_plan(&plans, "standard").is_some());
        assert!(find_plan(&plans, "STANDARD").is_some());
        assert!(find_plan(&plans, "free trial").is_some());
        assert_eq!(find_plan(&plans, "Basic").unwrap().plan_id, "Basic");
    }

    #[test]
    fn test_find_plan_missing() {
        let plans = catalog();
        assert!(find_plan(&plans, "Enterprise").is_none());
        assert!(find_plan(&plans, "").is_none());
    }

    #[test]
    fn test_duration_defaults_to_thirty_days() {
        let plan: Plan =
            serde_json::from_str(r#"{"plan_id": "Basic", "price": 5.0}"#).unwrap();
        assert_eq!(plan.duration_days, 30);
        assert_eq!(plan.image_credits, 0);
    }
}
