// ABOUTME: Command module exports
// ABOUTME: Wraps store operations into ApiResponse envelopes with readable messages

pub mod clients;
pub mod phones;

pub use clients::*;
pub use phones::*;

use crate::db::StoreError;
use crate::ApiResponse;

/// Rejections (bad input, empty filter) become warnings; everything else is an error
fn store_failure<T>(action: &str, e: StoreError) -> ApiResponse<T> {
    if e.is_rejection() {
        ApiResponse::rejected(None, e.to_string())
    } else {
        ApiResponse::error(format!("Failed to {}: {}", action, e))
    }
}
