//! Domain models for Penny

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A person whose spending is tracked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub joined_date: NaiveDate,
}

/// A new client (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub joined_date: NaiveDate,
}

impl NewClient {
    pub fn new(name: &str, joined_date: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            email: None,
            joined_date,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }
}

/// A single dated, categorized spend record owned by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub client_id: i64,
    /// Free-text label, e.g. "Groceries" or "Rent"
    pub category: String,
    pub description: Option<String>,
    /// Amount in USD (can be negative, e.g. refunds)
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// A new transaction to be stored (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl NewTransaction {
    pub fn new(category: &str, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            category: category.to_string(),
            description: None,
            amount,
            date,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(format!("Unknown chat role: {}", s)),
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One turn in a conversation
///
/// Transient: built per request and never persisted to the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(rename = "message", alias = "content")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    /// Stamp the message with the current time
    pub fn stamped(mut self) -> Self {
        self.timestamp = Some(Utc::now());
        self
    }

    pub fn is_system(&self) -> bool {
        self.role == ChatRole::System
    }
}
