//! Source catalog: `{ group: { domain: [address, ...] } }`
//!
//! Group keys only organise the file and are dropped on load. Domains and
//! addresses keep the order they appear in.

use crate::{
    error::{AppError, Result},
    models::{AddressRecord, DomainRecord},
};
use serde_json::Value;

/// Flatten source catalog text into unmeasured domain records
pub fn parse_source(text: &str) -> Result<Vec<DomainRecord>> {
    let root: Value = serde_json::from_str(text)?;

    let groups = root
        .as_object()
        .ok_or_else(|| AppError::format(format!("source catalog must be a mapping of groups, found {}", kind(&root))))?;

    let mut domains = Vec::new();
    for (group, entries) in groups {
        let entries = entries.as_object().ok_or_else(|| {
            AppError::format(format!("group '{}' must map domains to address lists, found {}", group, kind(entries)))
        })?;

        for (name, addresses) in entries {
            let addresses = addresses.as_array().ok_or_else(|| {
                AppError::format(format!("domain '{}' in group '{}' must list addresses, found {}", name, group, kind(addresses)))
            })?;

            let mut domain = DomainRecord::new(name.as_str());
            for address in addresses {
                let address = address.as_str().ok_or_else(|| {
                    AppError::format(format!("domain '{}' has a non-string address: {}", name, address))
                })?;
                domain.push(AddressRecord::new(address));
            }
            domains.push(domain);
        }
    }

    Ok(domains)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattens_groups_in_order() {
        let text = r#"{
            "us": {"zeta.example": ["10.0.0.2", "10.0.0.1"], "alpha.example": ["10.0.0.3"]},
            "eu": {"mid.example": []}
        }"#;
        let domains = parse_source(text).unwrap();

        let names: Vec<&str> = domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["zeta.example", "alpha.example", "mid.example"]);

        let addresses: Vec<&str> = domains[0].addresses.iter().map(|a| a.address.as_str()).collect();
        assert_eq!(addresses, ["10.0.0.2", "10.0.0.1"]);
        assert!(domains[0].addresses.iter().all(|a| !a.is_reachable()));
        assert!(domains[2].addresses.is_empty());
    }

    #[test]
    fn test_empty_mapping_is_empty_catalog() {
        assert!(parse_source("{}").unwrap().is_empty());
    }

    #[test]
    fn test_same_domain_in_two_groups_is_kept_twice() {
        let domains = parse_source(r#"{"a": {"d": ["1.1.1.1"]}, "b": {"d": ["2.2.2.2"]}}"#).unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[1].addresses[0].address, "2.2.2.2");
    }

    #[test]
    fn test_malformed_shapes() {
        for text in [
            "[]",
            r#"{"g": ["1.1.1.1"]}"#,
            r#"{"g": {"d": "1.1.1.1"}}"#,
            r#"{"g": {"d": [1]}}"#,
            "{not json",
        ] {
            assert!(matches!(parse_source(text), Err(AppError::Format(_))), "accepted {}", text);
        }
    }
}
