use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A child's health profile, keyed by `child_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub child_id: String,
    pub name: String,
    /// Age in whole years.
    pub age: u32,
    pub weight_kg: f64,
    /// Recorded allergens, matched case-insensitively.
    pub allergies: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Child {
    pub fn new(child_id: &str, name: &str, age: u32, weight_kg: f64) -> Self {
        Self {
            child_id: child_id.to_string(),
            name: name.to_string(),
            age,
            weight_kg,
            allergies: Vec::new(),
            updated_at: None,
        }
    }

    pub fn with_allergies<I, T>(mut self, allergies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.allergies = allergies.into_iter().map(Into::into).collect();
        self
    }
}
