//! Wire shapes of the catalog backend. Payloads arrive either bare or inside
//! the `{success, data, error}` envelope, and lists either bare or keyed.

use common::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        success: bool,
        data: Option<T>,
        #[serde(default)]
        error: Option<String>,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            Envelope::Bare(value) => Ok(value),
            Envelope::Wrapped {
                success: true,
                data: Some(value),
                ..
            } => Ok(value),
            Envelope::Wrapped {
                success: true,
                data: None,
                ..
            } => Err(Error::Upstream {
                status: 200,
                message: "response carried no data".into(),
            }),
            Envelope::Wrapped { error, .. } => Err(Error::Upstream {
                status: 200,
                message: error.unwrap_or_else(|| "request was not successful".into()),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Keyed {
        #[serde(alias = "columns", alias = "assets", alias = "rules")]
        items: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Keyed { items } | ListPayload::Bare(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::PiiRule;
    use serde::de::DeserializeOwned;

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
        let envelope: Envelope<T> = serde_json::from_str(body)?;
        envelope.into_result()
    }

    #[test]
    fn accepts_paginated_rule_envelope() {
        let body = r#"{
            "success": true,
            "data": {
                "rules": [{"id": 7, "pii_type": "ssn", "display_name": "SSN", "is_system_rule": true}],
                "pagination": {"page": 1, "total": 1}
            }
        }"#;
        let envelope: Envelope<ListPayload<PiiRule>> = serde_json::from_str(body).unwrap();
        let rules = envelope.into_result().unwrap().into_vec();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id.as_deref(), Some("7"));
        assert!(rules[0].is_enabled);
    }

    #[test]
    fn accepts_bare_list() {
        let envelope: Envelope<ListPayload<PiiRule>> =
            serde_json::from_str(r#"[{"pii_type": "email", "display_name": "Email"}]"#).unwrap();
        assert_eq!(envelope.into_result().unwrap().into_vec()[0].pii_type, "email");
    }

    #[test]
    fn failure_envelope_is_upstream_error() {
        let envelope: Envelope<ListPayload<PiiRule>> =
            serde_json::from_str(r#"{"success": false, "error": "database unavailable"}"#).unwrap();
        let err = envelope.into_result().unwrap_err();
        assert!(matches!(err, Error::Upstream { message, .. } if message == "database unavailable"));
    }

    #[test]
    fn generic_payload_without_default() {
        let ids: Vec<u32> = decode(r#"{"success": true, "data": [1, 2]}"#).unwrap();
        assert_eq!(ids, vec![1, 2]);

        let err = decode::<Vec<u32>>(r#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, Error::Upstream { message, .. } if message == "response carried no data"));
    }
}
