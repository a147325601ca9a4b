use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_FLOW_APP_ID: &str = "N/A";

/// Whether a flow is initiated with a generic request or a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestClass {
    Generic,
    Payment,
}

/// A participant application listed for a stage of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowApp {
    #[serde(default = "default_flow_app_id", deserialize_with = "deserialize_app_id")]
    id: String,
    /// If a mandatory app is not eligible, the whole flow is invalid for the device.
    #[serde(default)]
    mandatory: bool,
    /// Opaque key of a host-side predicate. Resolved by the host, never here.
    #[serde(default)]
    conditional_on: Option<String>,
    /// Route cancellation requests to this app while it is the active participant.
    #[serde(default)]
    delegate_cancellations_to: bool,
}

fn default_flow_app_id() -> String {
    DEFAULT_FLOW_APP_ID.to_string()
}

fn deserialize_app_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let id = Option::<String>::deserialize(deserializer)?;
    Ok(id.unwrap_or_else(default_flow_app_id))
}

impl FlowApp {
    pub fn new(id: &str) -> Self {
        Self::with_flags(id, false, None, false)
    }

    pub fn with_flags(
        id: &str,
        mandatory: bool,
        conditional_on: Option<&str>,
        delegate_cancellations_to: bool,
    ) -> Self {
        Self {
            id: id.to_string(),
            mandatory,
            conditional_on: conditional_on.map(str::to_string),
            delegate_cancellations_to,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn conditional_on(&self) -> Option<&str> {
        self.conditional_on.as_deref()
    }

    pub fn should_delegate_cancellations_to(&self) -> bool {
        self.delegate_cancellations_to
    }
}

/// One named stage of a flow and the apps listed for it, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStage {
    name: String,
    #[serde(default)]
    flow_apps: Vec<FlowApp>,
}

impl FlowStage {
    pub fn new(name: &str, flow_apps: Vec<FlowApp>) -> Self {
        Self {
            name: name.to_string(),
            flow_apps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flow_apps(&self) -> &[FlowApp] {
        &self.flow_apps
    }
}

/// Immutable declaration of a named flow.
///
/// Stage order is fixed when the configuration is built and there is no way
/// to change it afterwards. Deserialization goes through the same validation
/// as [`FlowConfig::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FlowConfigDocument", into = "FlowConfigDocument")]
pub struct FlowConfig {
    name: String,
    flow_type: String,
    request_class: RequestClass,
    stages: Vec<FlowStage>,
}

impl FlowConfig {
    pub fn new(
        name: &str,
        flow_type: &str,
        request_class: RequestClass,
        stages: Vec<FlowStage>,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(FlowError::ConfigurationError(
                "Flow name must be set".to_string(),
            ));
        }
        if flow_type.trim().is_empty() {
            return Err(FlowError::ConfigurationError(format!(
                "Flow '{}' has no type",
                name
            )));
        }

        let mut seen = HashSet::new();
        for stage in &stages {
            if stage.name.trim().is_empty() {
                return Err(FlowError::ConfigurationError(format!(
                    "Flow '{}' has a stage without a name",
                    name
                )));
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(FlowError::ConfigurationError(format!(
                    "Flow '{}' defines stage '{}' more than once",
                    name, stage.name
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            flow_type: flow_type.to_string(),
            request_class,
            stages,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flow_type(&self) -> &str {
        &self.flow_type
    }

    pub fn request_class(&self) -> RequestClass {
        self.request_class
    }

    pub fn stages(&self) -> &[FlowStage] {
        &self.stages
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|stage| stage.name.as_str())
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.stages.iter().any(|s| s.name == stage)
    }

    /// Apps listed for `stage`; empty if the stage is not defined.
    pub fn apps_for_stage(&self, stage: &str) -> &[FlowApp] {
        self.stages
            .iter()
            .find(|s| s.name == stage)
            .map(|s| s.flow_apps.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowConfigDocument {
    name: String,
    #[serde(rename = "type")]
    flow_type: String,
    request_class: RequestClass,
    #[serde(default)]
    stages: Vec<FlowStage>,
}

impl TryFrom<FlowConfigDocument> for FlowConfig {
    type Error = FlowError;

    fn try_from(doc: FlowConfigDocument) -> Result<Self> {
        FlowConfig::new(&doc.name, &doc.flow_type, doc.request_class, doc.stages)
    }
}

impl From<FlowConfig> for FlowConfigDocument {
    fn from(config: FlowConfig) -> Self {
        Self {
            name: config.name,
            flow_type: config.flow_type,
            request_class: config.request_class,
            stages: config.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALE_JSON: &str = r#"{
        "name": "sale",
        "type": "sale",
        "requestClass": "payment",
        "stages": [
            { "name": "PRE_FLOW", "flowApps": [ { "id": "com.loyalty", "mandatory": false, "conditionalOn": "hasBasket", "delegateCancellationsTo": true } ] },
            { "name": "TRANSACTION_PROCESSING", "flowApps": [ { "id": "com.acquirer", "mandatory": true } ] }
        ]
    }"#;

    #[test]
    fn test_flow_config_deserialization() {
        let config: FlowConfig = serde_json::from_str(SALE_JSON).unwrap();
        assert_eq!(config.name(), "sale");
        assert_eq!(config.flow_type(), "sale");
        assert_eq!(config.request_class(), RequestClass::Payment);
        assert_eq!(
            config.stage_names().collect::<Vec<_>>(),
            vec!["PRE_FLOW", "TRANSACTION_PROCESSING"]
        );

        let loyalty = &config.apps_for_stage("PRE_FLOW")[0];
        assert_eq!(loyalty.id(), "com.loyalty");
        assert_eq!(loyalty.conditional_on(), Some("hasBasket"));
        assert!(loyalty.should_delegate_cancellations_to());
        assert!(!loyalty.is_mandatory());

        assert!(config.apps_for_stage("TRANSACTION_PROCESSING")[0].is_mandatory());
        assert!(config.apps_for_stage("POST_FLOW").is_empty());
    }

    #[test]
    fn test_flow_app_id_defaults() {
        let missing: FlowApp = serde_json::from_str(r#"{"mandatory": true}"#).unwrap();
        assert_eq!(missing.id(), DEFAULT_FLOW_APP_ID);
        let null: FlowApp = serde_json::from_str(r#"{"id": null}"#).unwrap();
        assert_eq!(null.id(), DEFAULT_FLOW_APP_ID);
        assert!(!null.is_mandatory());
        assert_eq!(null.conditional_on(), None);
    }

    #[test]
    fn test_flow_app_equality_covers_all_fields() {
        let a = FlowApp::with_flags("app", true, Some("cond"), false);
        assert_eq!(a, FlowApp::with_flags("app", true, Some("cond"), false));
        assert_ne!(a, FlowApp::with_flags("app", false, Some("cond"), false));
        assert_ne!(a, FlowApp::with_flags("app", true, None, false));
        assert_ne!(a, FlowApp::with_flags("app", true, Some("cond"), true));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let no_type = r#"{"name": "sale", "requestClass": "payment", "stages": []}"#;
        assert!(serde_json::from_str::<FlowConfig>(no_type).is_err());

        let empty_name = r#"{"name": " ", "type": "sale", "requestClass": "payment"}"#;
        assert!(serde_json::from_str::<FlowConfig>(empty_name).is_err());

        let bad_class = r#"{"name": "sale", "type": "sale", "requestClass": "other"}"#;
        assert!(serde_json::from_str::<FlowConfig>(bad_class).is_err());
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let result = FlowConfig::new(
            "sale",
            "sale",
            RequestClass::Payment,
            vec![
                FlowStage::new("POST_FLOW", vec![]),
                FlowStage::new("POST_FLOW", vec![]),
            ],
        );
        assert!(matches!(result, Err(FlowError::ConfigurationError(_))));
    }

    #[test]
    fn test_serialization_uses_persisted_shape() {
        let config: FlowConfig = serde_json::from_str(SALE_JSON).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "sale");
        assert_eq!(json["requestClass"], "payment");
        assert_eq!(json["stages"][0]["flowApps"][0]["delegateCancellationsTo"], true);
        assert_eq!(json["stages"][1]["flowApps"][0]["conditionalOn"], serde_json::Value::Null);
    }
}
