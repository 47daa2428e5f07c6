//! DTOs for decoding remote directory collection pages.
//!
//! The remote API is loose about scalar types: identifiers arrive as numbers
//! or strings, and creation timestamps as epoch seconds (number or string) or
//! RFC 3339 text. The adapter decodes into these transport DTOs first, then
//! maps into domain records in one pass, keeping the raw item payload as
//! metadata.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::ports::{DirectoryPage, RemoteAccess, RemoteRecord};

#[derive(Debug, Deserialize)]
pub(super) struct DirectoryPageDto {
    #[serde(default)]
    pub(super) data: Vec<Value>,
    /// `false`, `null`, or absent on the final page. Some deployments send a
    /// link object instead of a boolean; any non-boolean marker means a
    /// further page exists.
    pub(super) next: Option<NextPageDto>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum NextPageDto {
    Flag(bool),
    Marker(Value),
}

impl NextPageDto {
    fn has_more(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Marker(_) => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryItemDto {
    id: RemoteIdDto,
    label: Option<String>,
    acronym: Option<String>,
    status: Option<String>,
    access: Option<String>,
    created: CreatedDto,
    #[serde(default, rename = "operation")]
    operations: Vec<OperationRefDto>,
}

#[derive(Debug, Deserialize)]
struct OperationRefDto {
    id: RemoteIdDto,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteIdDto {
    Number(i64),
    Text(String),
}

impl RemoteIdDto {
    fn into_string(self) -> String {
        match self {
            Self::Number(id) => id.to_string(),
            Self::Text(id) => id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatedDto {
    Seconds(i64),
    Text(String),
}

impl CreatedDto {
    fn into_timestamp(self) -> Result<DateTime<Utc>, String> {
        match self {
            Self::Seconds(seconds) => epoch_seconds(seconds),
            Self::Text(text) => {
                if let Ok(seconds) = text.parse::<i64>() {
                    return epoch_seconds(seconds);
                }
                DateTime::parse_from_rfc3339(&text)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .map_err(|error| format!("unparseable created value {text:?}: {error}"))
            }
        }
    }
}

fn epoch_seconds(seconds: i64) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| format!("epoch seconds {seconds} out of range"))
}

impl DirectoryPageDto {
    pub(super) fn into_domain_page(self) -> Result<DirectoryPage, String> {
        let next = self.next.as_ref().is_some_and(NextPageDto::has_more);
        let items = self
            .data
            .into_iter()
            .map(into_domain_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DirectoryPage { items, next })
    }
}

fn into_domain_record(raw: Value) -> Result<RemoteRecord, String> {
    let item: DirectoryItemDto = serde_json::from_value(raw.clone())
        .map_err(|error| format!("malformed directory item: {error}"))?;
    let id = item.id.into_string();
    let label = item.label.unwrap_or_else(|| id.clone());
    let access = match item.access.as_deref() {
        Some("closed") => RemoteAccess::Closed,
        _ => RemoteAccess::Open,
    };
    Ok(RemoteRecord {
        created: item.created.into_timestamp()?,
        operation_ids: item
            .operations
            .into_iter()
            .map(|reference| reference.id.into_string())
            .collect(),
        id,
        label,
        acronym: item.acronym,
        status: item.status,
        access,
        metadata: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> DirectoryPage {
        let dto: DirectoryPageDto = serde_json::from_str(body).expect("valid JSON");
        dto.into_domain_page().expect("domain mapping")
    }

    #[test]
    fn decodes_numeric_and_string_identifiers() {
        let page = decode(
            r#"{
                "data": [
                    { "id": 7, "label": "Somalia", "created": 1700000000 },
                    { "id": "abc-9", "label": "Yemen", "created": "1700000000" }
                ]
            }"#,
        );
        assert_eq!(page.items[0].id, "7");
        assert_eq!(page.items[1].id, "abc-9");
        assert!(!page.next, "absent next marker means the final page");
    }

    #[test]
    fn decodes_rfc3339_created_values() {
        let page = decode(
            r#"{
                "data": [
                    { "id": 1, "label": "Chad", "created": "2024-05-01T08:30:00Z" }
                ],
                "next": { "href": "irrelevant" }
            }"#,
        );
        assert_eq!(page.items[0].created.to_rfc3339(), "2024-05-01T08:30:00+00:00");
        assert!(page.next);
    }

    #[test]
    fn a_boolean_next_flag_is_honoured() {
        let item = r#"{ "id": 1, "label": "Chad", "created": 1700000000 }"#;
        let last = decode(&format!(r#"{{ "data": [ {item} ], "next": false }}"#));
        assert!(!last.next, "a JSON false must mean no further page");

        let more = decode(&format!(r#"{{ "data": [ {item} ], "next": true }}"#));
        assert!(more.next);

        let null = decode(&format!(r#"{{ "data": [ {item} ], "next": null }}"#));
        assert!(!null.next, "an explicit null marker also ends pagination");
    }

    #[test]
    fn maps_access_and_operation_references() {
        let page = decode(
            r#"{
                "data": [
                    {
                        "id": 42,
                        "label": "Flood Response",
                        "access": "closed",
                        "status": "active",
                        "created": 1700000000,
                        "operation": [ { "id": 7 }, { "id": "8" } ]
                    }
                ]
            }"#,
        );
        let item = &page.items[0];
        assert_eq!(item.access, RemoteAccess::Closed);
        assert_eq!(item.operation_ids, vec!["7".to_owned(), "8".to_owned()]);
        assert_eq!(item.metadata["label"], "Flood Response");
    }

    #[test]
    fn missing_labels_fall_back_to_the_identifier() {
        let page = decode(r#"{ "data": [ { "id": 3, "created": 1700000000 } ] }"#);
        assert_eq!(page.items[0].label, "3");
    }

    #[test]
    fn malformed_items_fail_the_page() {
        let dto: DirectoryPageDto =
            serde_json::from_str(r#"{ "data": [ { "label": "no id or created" } ] }"#)
                .expect("valid JSON");
        assert!(dto.into_domain_page().is_err());
    }
}
