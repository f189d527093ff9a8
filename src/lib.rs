// ABOUTME: Main library for the Client Book registry
// ABOUTME: Contains the response envelope shared by commands and module declarations

use serde::{Deserialize, Serialize};

// Module declarations
pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod output;

/// Standard response envelope for every command
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub messages: Messages,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Messages {
    pub error: Vec<String>,
    pub warning: Vec<String>,
    pub info: Vec<String>,
    pub success: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            messages: Messages::default(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            messages: Messages {
                error: vec![message],
                ..Default::default()
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The request was understood but could not be carried out (not found, invalid input)
    pub fn rejected(data: Option<T>, message: String) -> Self {
        Self {
            success: false,
            data,
            messages: Messages {
                warning: vec![message],
                ..Default::default()
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_success(mut self, message: String) -> Self {
        self.messages.success.push(message);
        self
    }

    pub fn with_info(mut self, message: String) -> Self {
        self.messages.info.push(message);
        self
    }

    /// Process exit status: 0 success, 1 error, 2 rejected request
    pub fn exit_code(&self) -> u8 {
        if !self.messages.error.is_empty() {
            1
        } else if !self.success {
            2
        } else {
            0
        }
    }
}
