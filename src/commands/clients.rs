// ABOUTME: Client commands
// ABOUTME: Create, update, delete, look up and list clients

use super::store_failure;
use crate::db::{ClientStore, SchemaInfo};
use crate::models::{Client, ClientFilter, ClientPatch, ClientRecord, NewClient, Removed, Updated};
use crate::ApiResponse;

/// Make sure the tables exist and report the layout in use
pub fn initialize(store: &ClientStore) -> ApiResponse<SchemaInfo> {
    if let Err(e) = store.initialize() {
        return store_failure("create tables", e);
    }
    match store.schema_info() {
        Ok(info) => {
            let message = format!("Tables ready ({} layout)", info.variant.as_str());
            ApiResponse::success(info).with_success(message)
        }
        Err(e) => store_failure("read schema info", e),
    }
}

/// Add a client, optionally with a first phone number
pub fn add_client(
    store: &mut ClientStore,
    name: String,
    surname: String,
    email: String,
    phone: Option<String>,
) -> ApiResponse<Client> {
    let new = NewClient {
        name,
        surname,
        email,
        phone,
    };

    match store.add_client(&new) {
        Ok(client) => {
            let message = format!(
                "Client {} {} was added with id {}",
                client.name, client.surname, client.id
            );
            ApiResponse::success(client).with_success(message)
        }
        Err(e) => store_failure("add client", e),
    }
}

/// Change only the supplied fields of a client
pub fn update_client(store: &mut ClientStore, id: i64, patch: ClientPatch) -> ApiResponse<Updated> {
    match store.update_client(id, &patch) {
        Ok(Updated::ClientNotFound) => ApiResponse::rejected(
            Some(Updated::ClientNotFound),
            format!("Client {} not found", id),
        ),
        Ok(Updated::NoChanges) => ApiResponse::success(Updated::NoChanges)
            .with_info(format!("No fields supplied, client {} left unchanged", id)),
        Ok(updated) => {
            ApiResponse::success(updated).with_success(format!("Client {} was updated", id))
        }
        Err(e) => store_failure("update client", e),
    }
}

/// Delete a client together with its phone numbers
pub fn delete_client(store: &mut ClientStore, id: i64) -> ApiResponse<Removed> {
    match store.delete_client(id) {
        Ok(Removed::NotFound) => {
            ApiResponse::rejected(Some(Removed::NotFound), format!("Client {} not found", id))
        }
        Ok(removed @ Removed::Removed { phones }) => {
            let message = if phones == 0 {
                format!("Client {} was deleted", id)
            } else {
                format!("Client {} was deleted along with {} phone(s)", id, phones)
            };
            ApiResponse::success(removed).with_success(message)
        }
        Err(e) => store_failure("delete client", e),
    }
}

/// Find clients matching every supplied field
pub fn find_clients(store: &ClientStore, filter: ClientFilter) -> ApiResponse<Vec<ClientRecord>> {
    match store.find_clients(&filter) {
        Ok(records) => {
            let message = format!("{} client(s) matched", records.len());
            ApiResponse::success(records).with_info(message)
        }
        Err(e) => store_failure("find clients", e),
    }
}

/// Get a single client with its phones
pub fn get_client(store: &ClientStore, id: i64) -> ApiResponse<ClientRecord> {
    match store.get_client(id) {
        Ok(Some(record)) => ApiResponse::success(record),
        Ok(None) => ApiResponse::rejected(None, format!("Client {} not found", id)),
        Err(e) => store_failure("get client", e),
    }
}

/// List every client
pub fn list_clients(store: &ClientStore) -> ApiResponse<Vec<ClientRecord>> {
    match store.list_clients() {
        Ok(records) => ApiResponse::success(records),
        Err(e) => store_failure("list clients", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchemaVariant;

    fn store() -> ClientStore {
        ClientStore::open_in_memory(SchemaVariant::Normalized).unwrap()
    }

    fn add(
        store: &mut ClientStore,
        name: &str,
        surname: &str,
        email: &str,
        phone: Option<&str>,
    ) -> i64 {
        add_client(
            store,
            name.to_string(),
            surname.to_string(),
            email.to_string(),
            phone.map(str::to_string),
        )
        .data
        .unwrap()
        .id
    }

    #[test]
    fn test_initialize_reports_layout() {
        let store = store();
        let response = initialize(&store);
        assert!(response.success);
        assert_eq!(response.data.unwrap().variant, SchemaVariant::Normalized);
        assert_eq!(response.messages.success, vec!["Tables ready (normalized layout)"]);
    }

    #[test]
    fn test_add_client_message() {
        let mut store = store();
        let response = add_client(
            &mut store,
            "Maxim".to_string(),
            "Rochev".to_string(),
            "ololo@mail.ru".to_string(),
            Some("88005555535".to_string()),
        );
        assert_eq!(response.exit_code(), 0);
        assert_eq!(
            response.messages.success,
            vec!["Client Maxim Rochev was added with id 1"]
        );
    }

    #[test]
    fn test_add_client_invalid_is_rejected() {
        let mut store = store();
        let response = add_client(
            &mut store,
            "Maxim".to_string(),
            " ".to_string(),
            "ololo@mail.ru".to_string(),
            None,
        );
        assert!(!response.success);
        assert_eq!(response.exit_code(), 2);
        assert_eq!(response.messages.warning, vec!["Invalid surname: must not be blank"]);
    }

    #[test]
    fn test_update_outcomes_distinguishable() {
        let mut store = store();
        let id = add(&mut store, "Dmitriy", "Demetyev", "balda@yandex.ru", None);

        let missing = update_client(&mut store, 99, ClientPatch::default());
        assert_eq!(missing.data, Some(Updated::ClientNotFound));
        assert_eq!(missing.exit_code(), 2);

        let unchanged = update_client(&mut store, id, ClientPatch::default());
        assert_eq!(unchanged.data, Some(Updated::NoChanges));
        assert_eq!(unchanged.exit_code(), 0);

        let patch = ClientPatch {
            name: Some("Dimka".to_string()),
            ..Default::default()
        };
        let applied = update_client(&mut store, id, patch);
        assert!(matches!(applied.data, Some(Updated::Applied { .. })));
    }

    #[test]
    fn test_delete_client_messages() {
        let mut store = store();
        let id = add(&mut store, "Dmitriy", "Semenov", "chilliburher@mail.ru", Some("89113524000"));

        let removed = delete_client(&mut store, id);
        assert_eq!(
            removed.messages.success,
            vec![format!("Client {} was deleted along with 1 phone(s)", id)]
        );

        let again = delete_client(&mut store, id);
        assert_eq!(again.data, Some(Removed::NotFound));
        assert_eq!(again.messages.warning, vec![format!("Client {} not found", id)]);
    }

    #[test]
    fn test_find_requires_a_field() {
        let mut store = store();
        add(&mut store, "Maxim", "Rochev", "ololo@mail.ru", None);

        let rejected = find_clients(&store, ClientFilter::default());
        assert_eq!(rejected.exit_code(), 2);
        assert!(rejected.data.is_none());

        let found = find_clients(&store, ClientFilter::by_name("Maxim"));
        assert_eq!(found.data.unwrap().len(), 1);
        assert_eq!(found.messages.info, vec!["1 client(s) matched"]);
    }

    #[test]
    fn test_get_and_list() {
        let mut store = store();
        let id = add(&mut store, "Polina", "Skiba", "polasha@mail.ru", None);
        assert_eq!(get_client(&store, id).data.unwrap().client.name, "Polina");
        assert_eq!(get_client(&store, id + 1).exit_code(), 2);
        assert_eq!(list_clients(&store).data.unwrap().len(), 1);
    }
}
