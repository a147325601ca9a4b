//! Which configured apps actually take part in a flow on this device.

use crate::domain::amounts::Currency;
use crate::domain::flow_config::{FlowApp, FlowConfig};
use crate::domain::ports::ConditionEvaluatorBox;
use crate::domain::service_info::ServiceRegistry;
use crate::error::{FlowError, Result};
use tracing::debug;

/// Transaction facts the eligibility rules depend on.
pub struct EligibilityContext {
    currency: Option<Currency>,
    evaluator: ConditionEvaluatorBox,
}

impl EligibilityContext {
    /// `currency` is `None` for flows that carry no amounts.
    pub fn new(currency: Option<Currency>, evaluator: ConditionEvaluatorBox) -> Self {
        Self {
            currency,
            evaluator,
        }
    }

    /// A context in which every `conditionalOn` key holds.
    pub fn unconditional(currency: Option<Currency>) -> Self {
        Self::new(currency, Box::new(|_: &str| true))
    }
}

/// A stage with the apps that will be called for it, in configured order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStage {
    pub name: String,
    pub apps: Vec<FlowApp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFlow {
    pub flow_name: String,
    pub stages: Vec<ResolvedStage>,
}

impl ResolvedFlow {
    pub fn apps_for_stage(&self, stage: &str) -> &[FlowApp] {
        self.stages
            .iter()
            .find(|s| s.name == stage)
            .map(|s| s.apps.as_slice())
            .unwrap_or_default()
    }
}

/// Where a cancellation during a stage is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationRoute {
    DelegateToApp(String),
    Host,
}

/// Why an app was left out of a stage.
fn ineligibility(
    app: &FlowApp,
    stage: &str,
    flow: &FlowConfig,
    services: &ServiceRegistry,
    context: &EligibilityContext,
) -> Option<String> {
    let Some(service) = services.get(app.id()) else {
        return Some("not installed".to_string());
    };
    if !service.supports_stage(stage) {
        return Some(format!("does not support stage {}", stage));
    }
    if let Some(condition) = app.conditional_on()
        && !context.evaluator.evaluate(condition)
    {
        return Some(format!("condition '{}' does not hold", condition));
    }
    if let Some(currency) = &context.currency
        && !service.supports_currency(currency)
    {
        return Some(format!("does not support currency {}", currency));
    }
    if !service.supports_flow_type(flow.flow_type()) {
        return Some(format!("does not support flow type {}", flow.flow_type()));
    }
    None
}

/// Resolves the eligible apps for every stage of `flow`.
///
/// Ineligible optional apps are left out. An ineligible mandatory app makes
/// the whole flow invalid for this device.
pub fn resolve_flow(
    flow: &FlowConfig,
    services: &ServiceRegistry,
    context: &EligibilityContext,
) -> Result<ResolvedFlow> {
    let mut stages = Vec::with_capacity(flow.stages().len());
    for stage in flow.stages() {
        let mut apps = Vec::new();
        for app in stage.flow_apps() {
            match ineligibility(app, stage.name(), flow, services, context) {
                None => apps.push(app.clone()),
                Some(reason) if app.is_mandatory() => {
                    return Err(FlowError::ConfigurationError(format!(
                        "Mandatory app '{}' in stage {} of flow '{}' is not eligible: {}",
                        app.id(),
                        stage.name(),
                        flow.name(),
                        reason
                    )));
                }
                Some(reason) => {
                    debug!(
                        flow = flow.name(),
                        stage = stage.name(),
                        app = app.id(),
                        %reason,
                        "skipping ineligible app"
                    );
                }
            }
        }
        stages.push(ResolvedStage {
            name: stage.name().to_string(),
            apps,
        });
    }
    Ok(ResolvedFlow {
        flow_name: flow.name().to_string(),
        stages,
    })
}

/// Routing of a cancellation raised while `active_app` is processing.
pub fn cancellation_route(active_app: &FlowApp) -> CancellationRoute {
    if active_app.should_delegate_cancellations_to() {
        CancellationRoute::DelegateToApp(active_app.id().to_string())
    } else {
        CancellationRoute::Host
    }
}
