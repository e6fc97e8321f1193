//! Request body validation.
//!
//! Payload structs mirror the wire format (camelCase, amounts and dates as
//! strings); validators turn them into domain inputs and report **every**
//! violated field rather than stopping at the first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ledgerflow_core::{Amount, StoreId, UserId};

use crate::error::ApiError;
use crate::models::{NewStore, NewTransaction, StoreUpdate, TransactionUpdate};

const MAX_STORE_NAME_CHARS: usize = 150;

const INVALID_STORE_DATA: &str = "Invalid store data";
const INVALID_TRANSACTION_DATA: &str = "Invalid transaction data";

/// A single violated field in a request body.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Wire-format field name (camelCase).
    pub field: String,
    /// Human-readable violation.
    pub message: String,
}

/// Unvalidated store payload (create and update share the shape).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Unvalidated transaction payload (create and update share the shape).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub date: Option<String>,
    pub amount_supplied: Option<String>,
    pub amount_remaining: Option<String>,
    pub notes: Option<String>,
}

/// Validate a store creation payload.
///
/// # Errors
///
/// Returns `ApiError::Validation` if the name is absent, empty, or longer
/// than 150 characters.
pub fn validate_new_store(payload: &StorePayload, owner_id: UserId) -> Result<NewStore, ApiError> {
    match require_name(payload.name.as_deref()) {
        Ok(name) => Ok(NewStore {
            name,
            description: payload.description.clone(),
            owner_id,
        }),
        Err(e) => Err(invalid(INVALID_STORE_DATA, vec![e])),
    }
}

/// Validate a store update payload; absent fields stay unchanged.
///
/// # Errors
///
/// Returns `ApiError::Validation` if a present name is empty or too long.
pub fn validate_store_update(payload: &StorePayload) -> Result<StoreUpdate, ApiError> {
    let name = match payload.name.as_deref() {
        None => None,
        Some(s) => match require_name(Some(s)) {
            Ok(name) => Some(name),
            Err(e) => return Err(invalid(INVALID_STORE_DATA, vec![e])),
        },
    };

    Ok(StoreUpdate {
        name,
        description: payload.description.clone(),
    })
}

/// Validate a transaction creation payload.
///
/// `amountRemaining` may be absent or empty and defaults to `"0.00"`; `date`
/// accepts RFC 3339 or a plain `YYYY-MM-DD` (midnight UTC).
///
/// # Errors
///
/// Returns `ApiError::Validation` listing every violated field.
pub fn validate_new_transaction(
    payload: &TransactionPayload,
    store_id: StoreId,
    created_by: UserId,
) -> Result<NewTransaction, ApiError> {
    let date = match payload.date.as_deref() {
        None | Some("") => Err(field_error("date", "is required")),
        Some(s) => parse_date(s).ok_or_else(|| field_error("date", "must be a valid date")),
    };
    let amount_supplied = match payload.amount_supplied.as_deref() {
        None => Err(field_error("amountSupplied", "is required")),
        Some(s) => Amount::parse(s).map_err(|e| field_error("amountSupplied", &e.to_string())),
    };
    let amount_remaining = match payload.amount_remaining.as_deref() {
        None | Some("") => Ok(Amount::ZERO),
        Some(s) => Amount::parse(s).map_err(|e| field_error("amountRemaining", &e.to_string())),
    };

    match (date, amount_supplied, amount_remaining) {
        (Ok(date), Ok(amount_supplied), Ok(amount_remaining)) => Ok(NewTransaction {
            store_id,
            date,
            amount_supplied,
            amount_remaining,
            notes: payload.notes.clone(),
            created_by,
        }),
        (date, amount_supplied, amount_remaining) => Err(invalid(
            INVALID_TRANSACTION_DATA,
            [date.err(), amount_supplied.err(), amount_remaining.err()]
                .into_iter()
                .flatten()
                .collect(),
        )),
    }
}

/// Validate a transaction update payload; absent fields stay unchanged.
///
/// An empty `amountRemaining` still resets to `"0.00"`, matching creation.
///
/// # Errors
///
/// Returns `ApiError::Validation` listing every violated field.
pub fn validate_transaction_update(
    payload: &TransactionPayload,
) -> Result<TransactionUpdate, ApiError> {
    let date = match payload.date.as_deref() {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| field_error("date", "must be a valid date")),
    };
    let amount_supplied = match payload.amount_supplied.as_deref() {
        None => Ok(None),
        Some(s) => Amount::parse(s)
            .map(Some)
            .map_err(|e| field_error("amountSupplied", &e.to_string())),
    };
    let amount_remaining = match payload.amount_remaining.as_deref() {
        None => Ok(None),
        Some("") => Ok(Some(Amount::ZERO)),
        Some(s) => Amount::parse(s)
            .map(Some)
            .map_err(|e| field_error("amountRemaining", &e.to_string())),
    };

    match (date, amount_supplied, amount_remaining) {
        (Ok(date), Ok(amount_supplied), Ok(amount_remaining)) => Ok(TransactionUpdate {
            date,
            amount_supplied,
            amount_remaining,
            notes: payload.notes.clone(),
        }),
        (date, amount_supplied, amount_remaining) => Err(invalid(
            INVALID_TRANSACTION_DATA,
            [date.err(), amount_supplied.err(), amount_remaining.err()]
                .into_iter()
                .flatten()
                .collect(),
        )),
    }
}

fn require_name(value: Option<&str>) -> Result<String, FieldError> {
    let name = value.unwrap_or_default();
    if name.is_empty() {
        return Err(field_error("name", "is required"));
    }
    if name.chars().count() > MAX_STORE_NAME_CHARS {
        return Err(field_error(
            "name",
            &format!("must be at most {MAX_STORE_NAME_CHARS} characters"),
        ));
    }
    Ok(name.to_owned())
}

/// Parse an RFC 3339 timestamp, or a plain date as midnight UTC.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn invalid(message: &str, errors: Vec<FieldError>) -> ApiError {
    ApiError::Validation {
        message: message.to_string(),
        errors,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn violated_fields(err: &ApiError) -> Vec<String> {
        match err {
            ApiError::Validation { errors, .. } => {
                errors.iter().map(|e| e.field.clone()).collect()
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_store_name_required() {
        let owner = UserId::random();

        let err = validate_new_store(&StorePayload::default(), owner).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["name"]);

        let err = validate_new_store(
            &StorePayload {
                name: Some(String::new()),
                description: None,
            },
            owner,
        )
        .unwrap_err();
        assert_eq!(violated_fields(&err), vec!["name"]);
    }

    #[test]
    fn test_store_name_length_limit() {
        let owner = UserId::random();

        let at_limit = StorePayload {
            name: Some("x".repeat(150)),
            description: None,
        };
        assert!(validate_new_store(&at_limit, owner).is_ok());

        let over = StorePayload {
            name: Some("x".repeat(151)),
            description: None,
        };
        let err = validate_new_store(&over, owner).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["name"]);

        // The limit counts characters, not bytes
        let multibyte = StorePayload {
            name: Some("é".repeat(150)),
            description: None,
        };
        assert!(validate_new_store(&multibyte, owner).is_ok());
    }

    #[test]
    fn test_store_update_keeps_absent_fields() {
        let update = validate_store_update(&StorePayload::default()).unwrap();
        assert_eq!(update.name, None);
        assert_eq!(update.description, None);

        let err = validate_store_update(&StorePayload {
            name: Some(String::new()),
            description: None,
        })
        .unwrap_err();
        assert_eq!(violated_fields(&err), vec!["name"]);
    }

    #[test]
    fn test_transaction_accepts_both_date_forms() {
        let store = StoreId::random();
        let user = UserId::random();

        let rfc3339 = validate_new_transaction(
            &TransactionPayload {
                date: Some("2026-02-15T09:30:00Z".to_owned()),
                amount_supplied: Some("100.00".to_owned()),
                amount_remaining: None,
                notes: None,
            },
            store,
            user,
        )
        .unwrap();
        assert_eq!(
            rfc3339.date,
            Utc.with_ymd_and_hms(2026, 2, 15, 9, 30, 0).unwrap()
        );

        let plain = validate_new_transaction(
            &TransactionPayload {
                date: Some("2026-02-15".to_owned()),
                amount_supplied: Some("100.00".to_owned()),
                amount_remaining: None,
                notes: None,
            },
            store,
            user,
        )
        .unwrap();
        assert_eq!(
            plain.date,
            Utc.with_ymd_and_hms(2026, 2, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_transaction_amount_pattern_rejected() {
        let err = validate_new_transaction(
            &TransactionPayload {
                date: Some("2026-02-15".to_owned()),
                amount_supplied: Some("12.345".to_owned()),
                amount_remaining: None,
                notes: None,
            },
            StoreId::random(),
            UserId::random(),
        )
        .unwrap_err();
        assert_eq!(violated_fields(&err), vec!["amountSupplied"]);
    }

    #[test]
    fn test_transaction_reports_every_violation() {
        let err = validate_new_transaction(
            &TransactionPayload::default(),
            StoreId::random(),
            UserId::random(),
        )
        .unwrap_err();
        assert_eq!(violated_fields(&err), vec!["date", "amountSupplied"]);
    }

    #[test]
    fn test_remaining_defaults_to_zero() {
        let store = StoreId::random();
        let user = UserId::random();

        for remaining in [None, Some(String::new())] {
            let tx = validate_new_transaction(
                &TransactionPayload {
                    date: Some("2026-02-15".to_owned()),
                    amount_supplied: Some("100.00".to_owned()),
                    amount_remaining: remaining,
                    notes: None,
                },
                store,
                user,
            )
            .unwrap();
            assert_eq!(tx.amount_remaining, Amount::ZERO);
        }
    }

    #[test]
    fn test_transaction_update_applies_present_fields_only() {
        let update = validate_transaction_update(&TransactionPayload::default()).unwrap();
        assert_eq!(update.date, None);
        assert_eq!(update.amount_supplied, None);
        assert_eq!(update.amount_remaining, None);
        assert_eq!(update.notes, None);

        let update = validate_transaction_update(&TransactionPayload {
            date: None,
            amount_supplied: None,
            amount_remaining: Some(String::new()),
            notes: Some("paid in cash".to_owned()),
        })
        .unwrap();
        assert_eq!(update.amount_remaining, Some(Amount::ZERO));
        assert_eq!(update.notes.as_deref(), Some("paid in cash"));

        let err = validate_transaction_update(&TransactionPayload {
            date: Some("not-a-date".to_owned()),
            amount_supplied: None,
            amount_remaining: None,
            notes: None,
        })
        .unwrap_err();
        assert_eq!(violated_fields(&err), vec!["date"]);
    }

    #[test]
    fn test_field_error_wire_shape() {
        let err = field_error("name", "is required");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"field": "name", "message": "is required"})
        );
    }
}
