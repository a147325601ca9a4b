use crate::application::configurations::FlowConfigurations;
use crate::domain::flow_config::FlowConfig;
use crate::domain::service_info::{ServiceInfoConfig, ServiceRegistry};
use crate::error::{FlowError, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;
use tracing::debug;

/// A document holds either a single entry or an array of entries.
fn entries(document: Value) -> Vec<Value> {
    match document {
        Value::Array(entries) => entries,
        single => vec![single],
    }
}

fn describe(entry: &Value, index: usize) -> String {
    entry
        .get("name")
        .or_else(|| entry.get("id"))
        .and_then(Value::as_str)
        .map(|name| format!("'{}'", name))
        .unwrap_or_else(|| format!("#{}", index))
}

/// Reads flow configurations from a JSON document.
///
/// Every flow is validated on its own, so one malformed flow does not keep
/// the others from loading.
pub struct FlowConfigReader<R: Read> {
    source: R,
}

impl<R: Read> FlowConfigReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Per-flow results in document order.
    ///
    /// Fails as a whole only if the document is not JSON. A flow whose name
    /// was already loaded is rejected; the first one wins.
    pub fn flows(self) -> Result<impl Iterator<Item = Result<FlowConfig>>> {
        let document: Value = serde_json::from_reader(self.source)?;
        let mut names = HashSet::new();
        Ok(entries(document)
            .into_iter()
            .enumerate()
            .map(move |(index, entry)| {
                let label = describe(&entry, index);
                let config: FlowConfig = serde_json::from_value(entry).map_err(|e| {
                    FlowError::ConfigurationError(format!("Flow {} is invalid: {}", label, e))
                })?;
                if !names.insert(config.name().to_string()) {
                    return Err(FlowError::ConfigurationError(format!(
                        "Flow '{}' is defined more than once",
                        config.name()
                    )));
                }
                Ok(config)
            }))
    }

    /// Loads every valid flow and returns the rejected ones alongside.
    pub fn load(self) -> Result<(FlowConfigurations, Vec<FlowError>)> {
        let mut configs = Vec::new();
        let mut rejected = Vec::new();
        for result in self.flows()? {
            match result {
                Ok(config) => configs.push(config),
                Err(e) => {
                    debug!(error = %e, "rejected flow configuration");
                    rejected.push(e);
                }
            }
        }
        Ok((FlowConfigurations::new(configs), rejected))
    }
}

/// Reads the service declarations of the installed flow apps.
///
/// Unlike flows, a single invalid declaration fails the whole registry.
pub fn read_service_registry<R: Read>(source: R) -> Result<ServiceRegistry> {
    let document: Value = serde_json::from_reader(source)?;
    entries(document)
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let label = describe(&entry, index);
            let config: ServiceInfoConfig = serde_json::from_value(entry).map_err(|e| {
                FlowError::ConfigurationError(format!("Service {} is invalid: {}", label, e))
            })?;
            config.build()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow_config::RequestClass;
    use crate::domain::stages::PAYMENT_CARD_READING;

    const FLOWS: &str = r#"[
        {
            "name": "sale",
            "type": "sale",
            "requestClass": "payment",
            "stages": [
                {"name": "PAYMENT_CARD_READING", "flowApps": [{"id": "reader", "mandatory": true}]}
            ]
        },
        {"name": "broken", "type": "sale", "requestClass": "sideways", "stages": []},
        {"name": "sale", "type": "refund", "requestClass": "payment", "stages": []},
        {"name": "loyalty", "type": "showLoyaltyPoints", "requestClass": "generic", "stages": []}
    ]"#;

    #[test]
    fn test_malformed_flow_isolated() {
        let (configs, rejected) = FlowConfigReader::new(FLOWS.as_bytes()).load().unwrap();

        assert_eq!(configs.len(), 2);
        assert_eq!(configs.get_flow_configuration("sale").unwrap().flow_type(), "sale");
        assert!(configs.is_stage_defined_for_flow(PAYMENT_CARD_READING, "sale"));
        assert_eq!(
            configs.get_flow_types(Some(RequestClass::Generic)),
            vec!["showLoyaltyPoints"]
        );

        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().all(|e| matches!(e, FlowError::ConfigurationError(_))));
        assert!(rejected[0].to_string().contains("'broken'"));
    }

    #[test]
    fn test_single_object_document() {
        let json = r#"{"name": "void", "type": "void", "requestClass": "payment", "stages": []}"#;
        let flows: Vec<Result<FlowConfig>> = FlowConfigReader::new(json.as_bytes())
            .flows()
            .unwrap()
            .collect();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].as_ref().unwrap().name(), "void");
    }

    #[test]
    fn test_not_json_fails_whole_document() {
        let result = FlowConfigReader::new("name: sale".as_bytes()).flows();
        assert!(matches!(result, Err(FlowError::SerializationError(_))));
    }

    #[test]
    fn test_service_registry() {
        let json = r#"[
            {"id": "reader", "vendor": "Example", "displayName": "Reader",
             "supportedStages": ["PAYMENT_CARD_READING"], "supportedCurrencies": ["GBP"]},
            {"id": "receipts", "vendor": "Example", "displayName": "Receipts"}
        ]"#;
        let registry = read_service_registry(json.as_bytes()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("reader").unwrap().supports_stage(PAYMENT_CARD_READING));

        let invalid = r#"{"id": "pay", "vendor": "Example", "displayName": "Pay", "canPayAmounts": true}"#;
        assert!(matches!(
            read_service_registry(invalid.as_bytes()),
            Err(FlowError::ConfigurationError(_))
        ));
    }
}
