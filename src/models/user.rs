use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    // Trip ids, in the order they were saved
    #[serde(default)]
    pub saved_itineraries: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id must not be empty".to_string());
        }
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if !self.email.contains('@') {
            return Err(format!("'{}' is not an email address", self.email));
        }
        Ok(())
    }

    pub fn into_user(self, created_at: DateTime<Utc>) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at,
            saved_itineraries: Vec::new(),
        }
    }
}
