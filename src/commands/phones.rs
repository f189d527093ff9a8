// ABOUTME: Phone number commands
// ABOUTME: Attach, list and remove phone numbers of existing clients

use super::store_failure;
use crate::db::ClientStore;
use crate::models::{PhoneAdded, PhoneRemoved};
use crate::ApiResponse;

/// Attach a phone number to an existing client
pub fn add_phone(
    store: &mut ClientStore,
    client_id: i64,
    number: String,
) -> ApiResponse<PhoneAdded> {
    match store.add_phone(client_id, &number) {
        Ok(added @ PhoneAdded::Added { .. }) => ApiResponse::success(added).with_success(format!(
            "Phone {} was added to client {}",
            number, client_id
        )),
        Ok(PhoneAdded::ClientNotFound) => ApiResponse::rejected(
            Some(PhoneAdded::ClientNotFound),
            format!("Client {} not found", client_id),
        ),
        Ok(PhoneAdded::SlotOccupied { existing }) => {
            let message = format!("Client {} already has phone {}", client_id, existing);
            ApiResponse::rejected(Some(PhoneAdded::SlotOccupied { existing }), message)
        }
        Err(e) => store_failure("add phone", e),
    }
}

/// Phone numbers of a client
pub fn get_phones(store: &ClientStore, client_id: i64) -> ApiResponse<Vec<String>> {
    match store.client_exists(client_id) {
        Ok(true) => {}
        Ok(false) => return ApiResponse::rejected(None, format!("Client {} not found", client_id)),
        Err(e) => return store_failure("get phones", e),
    }
    match store.phones_for(client_id) {
        Ok(phones) => ApiResponse::success(phones),
        Err(e) => store_failure("get phones", e),
    }
}

/// Remove one phone number from a client
pub fn delete_phone(
    store: &mut ClientStore,
    client_id: i64,
    number: String,
) -> ApiResponse<PhoneRemoved> {
    match store.delete_phone(client_id, &number) {
        Ok(removed @ PhoneRemoved::Removed { .. }) => ApiResponse::success(removed).with_success(
            format!("Phone {} was removed from client {}", number, client_id),
        ),
        Ok(PhoneRemoved::PhoneNotFound) => ApiResponse::rejected(
            Some(PhoneRemoved::PhoneNotFound),
            format!("Client {} has no phone {}", client_id, number),
        ),
        Ok(PhoneRemoved::ClientNotFound) => ApiResponse::rejected(
            Some(PhoneRemoved::ClientNotFound),
            format!("Client {} not found", client_id),
        ),
        Err(e) => store_failure("delete phone", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewClient, SchemaVariant};

    #[test]
    fn test_phone_lifecycle() {
        let mut store = ClientStore::open_in_memory(SchemaVariant::Normalized).unwrap();
        let id = store
            .add_client(&NewClient::new("Polina", "Skiba", "polasha@mail.ru"))
            .unwrap()
            .id;

        let added = add_phone(&mut store, id, "8991676553242".to_string());
        assert_eq!(added.exit_code(), 0);
        assert_eq!(
            added.messages.success,
            vec![format!("Phone 8991676553242 was added to client {}", id)]
        );
        assert_eq!(get_phones(&store, id).data.unwrap(), vec!["8991676553242"]);

        let removed = delete_phone(&mut store, id, "8991676553242".to_string());
        assert_eq!(removed.data, Some(PhoneRemoved::Removed { count: 1 }));

        let missing = delete_phone(&mut store, id, "8991676553242".to_string());
        assert_eq!(missing.data, Some(PhoneRemoved::PhoneNotFound));
        assert_eq!(missing.exit_code(), 2);
    }

    #[test]
    fn test_unknown_client() {
        let mut store = ClientStore::open_in_memory(SchemaVariant::Denormalized).unwrap();
        assert_eq!(
            add_phone(&mut store, 7, "1".to_string()).messages.warning,
            vec!["Client 7 not found"]
        );
        assert_eq!(get_phones(&store, 7).exit_code(), 2);
        assert_eq!(
            delete_phone(&mut store, 7, "1".to_string()).data,
            Some(PhoneRemoved::ClientNotFound)
        );
    }

    #[test]
    fn test_slot_occupied_is_rejected() {
        let mut store = ClientStore::open_in_memory(SchemaVariant::Denormalized).unwrap();
        let maxim = NewClient::new("Maxim", "Rochev", "ololo@mail.ru").with_phone("88005555535");
        let id = store.add_client(&maxim).unwrap().id;
        let response = add_phone(&mut store, id, "111".to_string());
        assert_eq!(response.exit_code(), 2);
        assert_eq!(
            response.messages.warning,
            vec![format!("Client {} already has phone 88005555535", id)]
        );
    }
}
