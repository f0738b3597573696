//! User entity - a student or academician account

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Reputation every account starts with
pub const DEFAULT_REPUTATION: f64 = 5.0;

/// Variant-specific data for the two kinds of university members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKind {
    Student { student_number: String },
    Academician { title: String, department: String },
}

impl UserKind {
    /// Stable discriminator stored alongside the user row
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student { .. } => "student",
            Self::Academician { .. } => "academician",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Student { .. } => "Student",
            Self::Academician { .. } => "Academician",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Snowflake,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub kind: UserKind,
    pub reputation: f64,
    pub profile_photo: Option<String>,
    pub is_online: bool,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: Snowflake,
        first_name: String,
        last_name: String,
        email: String,
        phone_number: String,
        kind: UserKind,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            phone_number,
            kind,
            reputation: DEFAULT_REPUTATION,
            profile_photo: None,
            is_online: false,
            last_active_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Two-letter initials, e.g. "AY" for "Ayse Yilmaz"
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .into_iter()
            .chain(self.last_name.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Subtract a penalty from reputation, never going below zero.
    /// Returns the new score.
    pub fn apply_penalty(&mut self, penalty: f64) -> f64 {
        self.reputation = (self.reputation - penalty).max(0.0);
        self.reputation
    }
}
