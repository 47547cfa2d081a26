//! Persisted user preferences (currently the mute flag).

/// Preference store trait and its JSON/in-memory implementations.
pub mod store;
