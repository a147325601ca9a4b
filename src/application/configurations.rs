use crate::domain::flow_config::{FlowConfig, RequestClass};
use std::sync::Arc;

/// Read-only queries over the flow configurations loaded on a device.
///
/// Cloning is cheap; all clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct FlowConfigurations {
    configs: Arc<Vec<FlowConfig>>,
}

impl FlowConfigurations {
    pub fn new(configs: Vec<FlowConfig>) -> Self {
        Self {
            configs: Arc::new(configs),
        }
    }

    pub fn get_all(&self) -> &[FlowConfig] {
        &self.configs
    }

    /// Restartable iterator: clone it to walk the set again.
    pub fn stream(&self) -> std::slice::Iter<'_, FlowConfig> {
        self.configs.iter()
    }

    pub fn get_flow_configuration(&self, flow_name: &str) -> Option<&FlowConfig> {
        self.stream().find(|config| config.name() == flow_name)
    }

    /// Distinct flow types in first-seen order, optionally limited to a request class.
    pub fn get_flow_types(&self, request_class: Option<RequestClass>) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for config in self.stream() {
            if let Some(class) = request_class
                && config.request_class() != class
            {
                continue;
            }
            if !types.iter().any(|t| t == config.flow_type()) {
                types.push(config.flow_type().to_string());
            }
        }
        types
    }

    pub fn is_flow_type_supported(&self, flow_type: &str) -> bool {
        self.stream().any(|config| config.flow_type() == flow_type)
    }

    pub fn get_flow_names_for_type(&self, flow_types: &[&str]) -> Vec<String> {
        self.get_flow_configs_for_type(flow_types)
            .into_iter()
            .map(|config| config.name().to_string())
            .collect()
    }

    pub fn get_flow_configs_for_type(&self, flow_types: &[&str]) -> Vec<&FlowConfig> {
        self.stream()
            .filter(|config| flow_types.contains(&config.flow_type()))
            .collect()
    }

    /// False for an unknown flow.
    pub fn is_stage_defined_for_flow(&self, stage: &str, flow_name: &str) -> bool {
        self.get_flow_configuration(flow_name)
            .is_some_and(|config| config.has_stage(stage))
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl FromIterator<FlowConfig> for FlowConfigurations {
    fn from_iter<I: IntoIterator<Item = FlowConfig>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
