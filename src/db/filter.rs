// ABOUTME: Fixed set of client fields usable in lookups and updates
// ABOUTME: Turns filters and patches into parameterized SQL fragments

use super::store::StoreError;
use crate::models::{
    ClientFilter, ClientPatch, SchemaVariant, EMAIL_MAX, NAME_MAX, PHONE_MAX, SURNAME_MAX,
};

/// Client fields that may appear in SQL text. Column names only ever come from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    Name,
    Surname,
    Email,
    Phone,
}

impl ClientField {
    pub const ALL: [ClientField; 4] = [
        ClientField::Name,
        ClientField::Surname,
        ClientField::Email,
        ClientField::Phone,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClientField::Name => "name",
            ClientField::Surname => "surname",
            ClientField::Email => "email",
            ClientField::Phone => "phone",
        }
    }

    pub fn max_len(&self) -> usize {
        match self {
            ClientField::Name => NAME_MAX,
            ClientField::Surname => SURNAME_MAX,
            ClientField::Email => EMAIL_MAX,
            ClientField::Phone => PHONE_MAX,
        }
    }

    /// Reject blank values and values longer than the column allows
    pub fn validate(&self, value: &str) -> Result<(), StoreError> {
        if value.trim().is_empty() {
            return Err(StoreError::Validation {
                field: self.label(),
                reason: "must not be blank".to_string(),
            });
        }
        let len = value.chars().count();
        if len > self.max_len() {
            return Err(StoreError::Validation {
                field: self.label(),
                reason: format!("is {} characters, at most {} allowed", len, self.max_len()),
            });
        }
        Ok(())
    }

    /// Equality predicate against a row of `client`, with one `?` placeholder
    pub fn predicate(&self, variant: SchemaVariant) -> &'static str {
        match (self, variant) {
            (ClientField::Name, _) => "name = ?",
            (ClientField::Surname, _) => "surname = ?",
            (ClientField::Email, _) => "email = ?",
            (ClientField::Phone, SchemaVariant::Denormalized) => "phone = ?",
            (ClientField::Phone, SchemaVariant::Normalized) => {
                "EXISTS (SELECT 1 FROM phone \
                 WHERE phone.client_id = client.id AND phone.number = ?)"
            }
        }
    }

    /// `SET` assignment on the `client` table, if the field lives there
    pub fn assignment(&self, variant: SchemaVariant) -> Option<&'static str> {
        match (self, variant) {
            (ClientField::Name, _) => Some("name = ?"),
            (ClientField::Surname, _) => Some("surname = ?"),
            (ClientField::Email, _) => Some("email = ?"),
            (ClientField::Phone, SchemaVariant::Denormalized) => Some("phone = ?"),
            (ClientField::Phone, SchemaVariant::Normalized) => None,
        }
    }
}

/// SQL fragment plus the values bound to its placeholders, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
    pub sql: String,
    pub values: Vec<String>,
}

fn supplied<'a>(
    name: &'a Option<String>,
    surname: &'a Option<String>,
    email: &'a Option<String>,
    phone: &'a Option<String>,
) -> Vec<(ClientField, &'a str)> {
    ClientField::ALL
        .iter()
        .zip([name, surname, email, phone])
        .filter_map(|(field, value)| value.as_deref().map(|v| (*field, v)))
        .collect()
}

/// Non-blank fields of a filter, in declaration order
pub fn filter_fields(filter: &ClientFilter) -> Vec<(ClientField, &str)> {
    supplied(&filter.name, &filter.surname, &filter.email, &filter.phone)
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
}

/// Fields present in a patch, in declaration order
pub fn patch_fields(patch: &ClientPatch) -> Vec<(ClientField, &str)> {
    supplied(&patch.name, &patch.surname, &patch.email, &patch.phone)
}

/// Build the body of a `WHERE` clause: supplied fields conjoined by `AND`.
///
/// Blank values are skipped; a filter with no remaining fields is rejected rather than
/// turned into an empty clause.
pub fn where_clause(
    filter: &ClientFilter,
    variant: SchemaVariant,
) -> Result<SqlFragment, StoreError> {
    if filter.is_empty() {
        return Err(StoreError::EmptyFilter);
    }
    let fields = filter_fields(filter);

    let sql = fields
        .iter()
        .map(|(field, _)| field.predicate(variant))
        .collect::<Vec<_>>()
        .join(" AND ");
    let values = fields.iter().map(|(_, v)| v.to_string()).collect();

    log::debug!("lookup predicate: {}", sql);
    Ok(SqlFragment { sql, values })
}

/// Build the `SET` list for the patch fields stored on `client`; `None` if there are none
pub fn set_clause(patch: &ClientPatch, variant: SchemaVariant) -> Option<SqlFragment> {
    let mut assignments = Vec::new();
    let mut values = Vec::new();
    for (field, value) in patch_fields(patch) {
        if let Some(assignment) = field.assignment(variant) {
            assignments.push(assignment);
            values.push(value.to_string());
        }
    }

    if assignments.is_empty() {
        return None;
    }
    Some(SqlFragment {
        sql: assignments.join(", "),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_field_where() {
        let clause =
            where_clause(&ClientFilter::by_name("Maxim"), SchemaVariant::Normalized).unwrap();
        assert_eq!(clause.sql, "name = ?");
        assert_eq!(clause.values, vec!["Maxim"]);
    }

    #[test]
    fn test_fields_joined_with_and() {
        let filter = ClientFilter {
            name: Some("Dmitriy".to_string()),
            email: Some("balda@yandex.ru".to_string()),
            ..Default::default()
        };
        let clause = where_clause(&filter, SchemaVariant::Normalized).unwrap();
        assert_eq!(clause.sql, "name = ? AND email = ?");
        assert_eq!(clause.values, vec!["Dmitriy", "balda@yandex.ru"]);
    }

    #[test]
    fn test_phone_predicate_per_variant() {
        let filter = ClientFilter {
            phone: Some("89113524000".to_string()),
            ..Default::default()
        };
        let normalized = where_clause(&filter, SchemaVariant::Normalized).unwrap();
        assert!(normalized.sql.starts_with("EXISTS (SELECT 1 FROM phone"));
        let denormalized = where_clause(&filter, SchemaVariant::Denormalized).unwrap();
        assert_eq!(denormalized.sql, "phone = ?");
    }

    #[test]
    fn test_empty_filter_rejected() {
        let err = where_clause(&ClientFilter::default(), SchemaVariant::Normalized).unwrap_err();
        assert!(matches!(err, StoreError::EmptyFilter));
    }

    #[test]
    fn test_blank_values_are_not_filters() {
        let blank = ClientFilter {
            name: Some(String::new()),
            email: Some("   ".to_string()),
            ..Default::default()
        };
        let err = where_clause(&blank, SchemaVariant::Normalized).unwrap_err();
        assert!(matches!(err, StoreError::EmptyFilter));

        let mixed = ClientFilter {
            name: Some("Maxim".to_string()),
            surname: Some(String::new()),
            ..Default::default()
        };
        let clause = where_clause(&mixed, SchemaVariant::Denormalized).unwrap();
        assert_eq!(clause.sql, "name = ?");
        assert_eq!(clause.values, vec!["Maxim"]);
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let filter = ClientFilter {
            surname: Some("x'; DROP TABLE client; --".to_string()),
            ..Default::default()
        };
        let clause = where_clause(&filter, SchemaVariant::Denormalized).unwrap();
        assert_eq!(clause.sql, "surname = ?");
        assert!(!clause.sql.contains("DROP"));
    }

    #[test]
    fn test_set_clause() {
        let patch = ClientPatch {
            name: Some("Dimka".to_string()),
            surname: Some("Dimontiev".to_string()),
            phone: Some("123".to_string()),
            ..Default::default()
        };
        let set = set_clause(&patch, SchemaVariant::Normalized).unwrap();
        assert_eq!(set.sql, "name = ?, surname = ?");
        assert_eq!(set.values, vec!["Dimka", "Dimontiev"]);

        let set = set_clause(&patch, SchemaVariant::Denormalized).unwrap();
        assert_eq!(set.sql, "name = ?, surname = ?, phone = ?");

        let phone_only = ClientPatch {
            phone: Some("123".to_string()),
            ..Default::default()
        };
        assert!(set_clause(&phone_only, SchemaVariant::Normalized).is_none());
    }

    #[test]
    fn test_validate() {
        assert!(ClientField::Name.validate("Maxim").is_ok());
        assert!(ClientField::Name.validate("   ").is_err());
        assert!(ClientField::Name.validate(&"a".repeat(NAME_MAX)).is_ok());
        assert!(ClientField::Name.validate(&"a".repeat(NAME_MAX + 1)).is_err());
        // characters, not bytes
        assert!(ClientField::Surname.validate(&"ж".repeat(SURNAME_MAX)).is_ok());
        assert!(ClientField::Email.validate(&"e".repeat(EMAIL_MAX + 1)).is_err());
        assert!(ClientField::Phone.validate(&"1".repeat(PHONE_MAX)).is_ok());
    }
}
