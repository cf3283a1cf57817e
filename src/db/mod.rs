//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// User accounts, keyed by identity-provider uid
    pub const USERS: &str = "user_data";
    /// Plan catalog (read-only, seeded out-of-band)
    pub const PLANS: &str = "plans";
}
