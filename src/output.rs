// ABOUTME: Console rendering of command responses
// ABOUTME: Plain text lines for people, pretty JSON envelopes for scripts

use serde::Serialize;

use crate::config::OutputFormat;
use crate::db::SchemaInfo;
use crate::models::{Client, ClientRecord, PhoneAdded, PhoneRemoved, Removed, Updated};
use crate::ApiResponse;

/// Text lines describing a response payload
pub trait TextView {
    fn text_lines(&self) -> Vec<String>;
}

impl TextView for () {
    fn text_lines(&self) -> Vec<String> {
        Vec::new()
    }
}

impl TextView for Client {
    fn text_lines(&self) -> Vec<String> {
        vec![format!(
            "({}, '{}', '{}', '{}')",
            self.id, self.name, self.surname, self.email
        )]
    }
}

impl TextView for ClientRecord {
    fn text_lines(&self) -> Vec<String> {
        let client = &self.client;
        let phones = if self.phones.is_empty() {
            "no phone numbers".to_string()
        } else {
            format!("phone numbers {}", self.phones.join(", "))
        };
        vec![format!(
            "Client ({}, '{}', '{}', '{}') {}",
            client.id, client.name, client.surname, client.email, phones
        )]
    }
}

impl<T: TextView> TextView for Vec<T> {
    fn text_lines(&self) -> Vec<String> {
        self.iter().flat_map(TextView::text_lines).collect()
    }
}

impl TextView for String {
    fn text_lines(&self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl TextView for SchemaInfo {
    fn text_lines(&self) -> Vec<String> {
        vec![format!(
            "layout: {}, last version seen: {}",
            self.variant.as_str(),
            self.last_version_seen
        )]
    }
}

impl TextView for Updated {
    fn text_lines(&self) -> Vec<String> {
        match self {
            Updated::Applied { record } => record.text_lines(),
            Updated::NoChanges | Updated::ClientNotFound => Vec::new(),
        }
    }
}

// Outcomes of these are fully described by their messages
impl TextView for PhoneAdded {
    fn text_lines(&self) -> Vec<String> {
        Vec::new()
    }
}

impl TextView for PhoneRemoved {
    fn text_lines(&self) -> Vec<String> {
        Vec::new()
    }
}

impl TextView for Removed {
    fn text_lines(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Rendered response, split by destination stream
#[derive(Debug, Default, PartialEq)]
pub struct Rendered {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

pub fn render<T: Serialize + TextView>(
    response: &ApiResponse<T>,
    format: OutputFormat,
) -> Result<Rendered, serde_json::Error> {
    match format {
        OutputFormat::Json => Ok(Rendered {
            stdout: vec![serde_json::to_string_pretty(response)?],
            stderr: Vec::new(),
        }),
        OutputFormat::Text => {
            let mut rendered = Rendered::default();
            rendered.stdout.extend(response.messages.success.iter().cloned());
            if let Some(data) = &response.data {
                rendered.stdout.extend(data.text_lines());
            }
            rendered.stdout.extend(response.messages.info.iter().cloned());
            rendered.stderr.extend(response.messages.warning.iter().cloned());
            rendered
                .stderr
                .extend(response.messages.error.iter().map(|e| format!("error: {}", e)));
            Ok(rendered)
        }
    }
}

/// Print a response and return its exit status
pub fn emit<T: Serialize + TextView>(
    response: &ApiResponse<T>,
    format: OutputFormat,
) -> Result<u8, serde_json::Error> {
    let rendered = render(response, format)?;
    for line in &rendered.stdout {
        println!("{}", line);
    }
    for line in &rendered.stderr {
        eprintln!("{}", line);
    }
    Ok(response.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(phones: &[&str]) -> ClientRecord {
        ClientRecord {
            client: Client {
                id: 3,
                name: "Dmitriy".to_string(),
                surname: "Semenov".to_string(),
                email: "chilliburher@mail.ru".to_string(),
            },
            phones: phones.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_record_lines() {
        assert_eq!(
            record(&[]).text_lines(),
            vec!["Client (3, 'Dmitriy', 'Semenov', 'chilliburher@mail.ru') no phone numbers"]
        );
        assert_eq!(
            record(&["1", "2"]).text_lines(),
            vec!["Client (3, 'Dmitriy', 'Semenov', 'chilliburher@mail.ru') phone numbers 1, 2"]
        );
    }

    #[test]
    fn test_text_render_orders_messages() {
        let response = ApiResponse::success(vec![record(&[])])
            .with_success("ok".to_string())
            .with_info("1 client(s) matched".to_string());
        let rendered = render(&response, OutputFormat::Text).unwrap();
        assert_eq!(rendered.stdout.len(), 3);
        assert_eq!(rendered.stdout[0], "ok");
        assert_eq!(rendered.stdout[2], "1 client(s) matched");
        assert!(rendered.stderr.is_empty());
    }

    #[test]
    fn test_warnings_and_errors_go_to_stderr() {
        let rejected = ApiResponse::<()>::rejected(None, "Client 9 not found".to_string());
        let rendered = render(&rejected, OutputFormat::Text).unwrap();
        assert!(rendered.stdout.is_empty());
        assert_eq!(rendered.stderr, vec!["Client 9 not found"]);

        let failed = ApiResponse::<()>::error("disk full".to_string());
        let rendered = render(&failed, OutputFormat::Text).unwrap();
        assert_eq!(rendered.stderr, vec!["error: disk full"]);
    }

    #[test]
    fn test_json_render() {
        let response = ApiResponse::success(record(&["1"]));
        let rendered = render(&response, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered.stdout[0]).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["surname"], "Semenov");
        assert_eq!(value["data"]["phones"][0], "1");
    }
}
