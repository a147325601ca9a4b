use crate::domain::amounts::Currency;
use crate::domain::messages::AdditionalData;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

const RESERVED_REQUEST_TYPE: &str = "payment";

/// What a flow service declares about itself.
///
/// This is the single place where a service's declaration is validated; see
/// [`ServiceInfoConfig::build`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceInfoConfig {
    pub id: String,
    pub vendor: String,
    pub display_name: String,
    pub supports_accessibility: bool,
    pub default_currency: Option<String>,
    pub supported_currencies: Vec<String>,
    pub supported_flow_types: Vec<String>,
    pub supported_stages: Vec<String>,
    pub custom_request_types: Vec<String>,
    pub supported_data_keys: Vec<String>,
    pub can_adjust_amounts: bool,
    pub can_pay_amounts: bool,
    pub payment_methods: Vec<String>,
    pub additional_info: AdditionalData,
}

impl ServiceInfoConfig {
    pub fn build(self) -> Result<PaymentFlowServiceInfo> {
        let invalid = |message: String| FlowError::ConfigurationError(message);

        if self.id.trim().is_empty() {
            return Err(invalid("Service id must be set".to_string()));
        }
        if self.vendor.trim().is_empty() {
            return Err(invalid(format!("Vendor must be set for '{}'", self.id)));
        }
        if self.display_name.trim().is_empty() {
            return Err(invalid(format!("Display name must be set for '{}'", self.id)));
        }
        if self.can_pay_amounts && self.payment_methods.is_empty() {
            return Err(invalid(format!(
                "'{}' can pay amounts but declares no payment methods",
                self.id
            )));
        }
        if self
            .custom_request_types
            .iter()
            .any(|t| t == RESERVED_REQUEST_TYPE)
        {
            return Err(invalid(format!(
                "'{}' is not a valid custom request type",
                RESERVED_REQUEST_TYPE
            )));
        }

        let default_currency = self
            .default_currency
            .or_else(|| self.supported_currencies.first().cloned())
            .map(Currency::new)
            .transpose()
            .map_err(|e| invalid(format!("'{}': {}", self.id, e)))?;
        let supported_currencies = self
            .supported_currencies
            .into_iter()
            .map(Currency::new)
            .collect::<Result<BTreeSet<_>>>()
            .map_err(|e| invalid(format!("'{}': {}", self.id, e)))?;

        Ok(PaymentFlowServiceInfo {
            id: self.id,
            vendor: self.vendor,
            display_name: self.display_name,
            supports_accessibility: self.supports_accessibility,
            default_currency,
            supported_currencies,
            supported_flow_types: self.supported_flow_types.into_iter().collect(),
            supported_stages: self.supported_stages.into_iter().collect(),
            custom_request_types: self.custom_request_types.into_iter().collect(),
            supported_data_keys: self.supported_data_keys.into_iter().collect(),
            can_adjust_amounts: self.can_adjust_amounts,
            can_pay_amounts: self.can_pay_amounts,
            payment_methods: self.payment_methods.into_iter().collect(),
            additional_info: self.additional_info,
        })
    }
}

/// Validated, immutable description of an installed flow service.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFlowServiceInfo {
    id: String,
    vendor: String,
    display_name: String,
    supports_accessibility: bool,
    default_currency: Option<Currency>,
    supported_currencies: BTreeSet<Currency>,
    supported_flow_types: BTreeSet<String>,
    supported_stages: BTreeSet<String>,
    custom_request_types: BTreeSet<String>,
    supported_data_keys: BTreeSet<String>,
    can_adjust_amounts: bool,
    can_pay_amounts: bool,
    payment_methods: BTreeSet<String>,
    additional_info: AdditionalData,
}

impl PaymentFlowServiceInfo {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn supports_accessibility(&self) -> bool {
        self.supports_accessibility
    }

    pub fn default_currency(&self) -> Option<&Currency> {
        self.default_currency.as_ref()
    }

    pub fn can_adjust_amounts(&self) -> bool {
        self.can_adjust_amounts
    }

    pub fn can_pay_amounts(&self) -> bool {
        self.can_pay_amounts
    }

    pub fn payment_methods(&self) -> &BTreeSet<String> {
        &self.payment_methods
    }

    pub fn custom_request_types(&self) -> &BTreeSet<String> {
        &self.custom_request_types
    }

    pub fn supported_data_keys(&self) -> &BTreeSet<String> {
        &self.supported_data_keys
    }

    pub fn additional_info(&self) -> &AdditionalData {
        &self.additional_info
    }

    pub fn supports_stage(&self, stage: &str) -> bool {
        self.supported_stages.contains(stage)
    }

    /// An empty currency list means every currency is supported.
    pub fn supports_currency(&self, currency: &Currency) -> bool {
        self.supported_currencies.is_empty() || self.supported_currencies.contains(currency)
    }

    /// An empty flow type list means the service is called for any type.
    pub fn supports_flow_type(&self, flow_type: &str) -> bool {
        self.supported_flow_types.is_empty() || self.supported_flow_types.contains(flow_type)
    }
}

/// Installed flow services, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, PaymentFlowServiceInfo>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service. A later registration with the same id replaces the earlier one.
    pub fn register(&mut self, info: PaymentFlowServiceInfo) {
        self.services.insert(info.id.clone(), info);
    }

    pub fn get(&self, id: &str) -> Option<&PaymentFlowServiceInfo> {
        self.services.get(id)
    }

    pub fn is_installed(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl FromIterator<PaymentFlowServiceInfo> for ServiceRegistry {
    fn from_iter<I: IntoIterator<Item = PaymentFlowServiceInfo>>(iter: I) -> Self {
        let mut registry = Self::new();
        for info in iter {
            registry.register(info);
        }
        registry
    }
}
