// ABOUTME: Shared data models for Client Book
// ABOUTME: Clients, phones, patches and lookup filters passed between store, commands and CLI

use serde::{Deserialize, Serialize};

/// Maximum lengths, in characters, of the text columns
pub const NAME_MAX: usize = 30;
pub const SURNAME_MAX: usize = 30;
pub const EMAIL_MAX: usize = 60;
pub const PHONE_MAX: usize = 100;

/// Which of the two table layouts a database uses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Separate `phone` table, any number of phones per client
    #[default]
    Normalized,
    /// Phone number stored as a nullable column on `client`
    Denormalized,
}

impl SchemaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Normalized => "normalized",
            SchemaVariant::Denormalized => "denormalized",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normalized" => Some(SchemaVariant::Normalized),
            "denormalized" => Some(SchemaVariant::Denormalized),
            _ => None,
        }
    }
}

/// A client row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
}

/// A phone row (normalized layout only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phone {
    pub id: i64,
    #[serde(rename = "clientId")]
    pub client_id: i64,
    pub number: String,
}

/// A client together with all of its phone numbers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientRecord {
    #[serde(flatten)]
    pub client: Client,
    pub phones: Vec<String>,
}

/// Input for creating a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewClient {
    pub fn new(name: &str, surname: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }
}

/// Partial update of a client; `None` fields are left alone
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClientPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

/// Equality filters for a lookup; all supplied fields must match
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClientFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ClientFilter {
    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// True when no field carries a non-blank value; blank values do not count as filters
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.surname, &self.email, &self.phone]
            .iter()
            .all(|value| value.as_deref().map_or(true, |v| v.trim().is_empty()))
    }
}

/// Result of attaching a phone to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PhoneAdded {
    Added { phone: Phone },
    ClientNotFound,
    /// Denormalized layout only: the client already has a phone
    SlotOccupied { existing: String },
}

/// Result of a partial update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Updated {
    Applied { record: ClientRecord },
    NoChanges,
    ClientNotFound,
}

/// Result of deleting a client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Removed {
    Removed { phones: usize },
    NotFound,
}

/// Result of deleting a phone number from a client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PhoneRemoved {
    Removed { count: usize },
    ClientNotFound,
    PhoneNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch_and_filter() {
        assert!(ClientPatch::default().is_empty());
        assert!(ClientFilter::default().is_empty());
        assert!(!ClientFilter::by_name("Maxim").is_empty());
        assert!(ClientFilter::by_name("  ").is_empty());
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(SchemaVariant::parse("normalized"), Some(SchemaVariant::Normalized));
        assert_eq!(SchemaVariant::parse("denormalized"), Some(SchemaVariant::Denormalized));
        assert_eq!(SchemaVariant::parse("other"), None);
        assert_eq!(
            serde_json::to_string(&SchemaVariant::Denormalized).unwrap(),
            "\"denormalized\""
        );
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = ClientRecord {
            client: Client {
                id: 1,
                name: "Maxim".to_string(),
                surname: "Rochev".to_string(),
                email: "ololo@mail.ru".to_string(),
            },
            phones: vec!["88005555535".to_string()],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Maxim");
        assert_eq!(json["phones"][0], "88005555535");
    }
}
