//! The preflight orchestrator.
//!
//! One linear accumulation pass over the plan: classify, synthesize,
//! validate, record. No retries, no rollback, no partial commit — every
//! validate call is read-only against the provider. Validation calls may
//! optionally run under a bounded concurrency limit; the failure sequence
//! always comes out in the plan's original order.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::azure::{ArmErrorDetail, ValidationClient, ValidationOutcome};
use crate::classifier::ResourceClassifier;
use crate::error::{CloudgateError, Result};
use crate::plan::PlanDocument;
use crate::synth::{ArmTemplate, TemplateSynthesizer};

use super::report::{DiagnosticContext, FailureKind, PreflightReport, ResourceFailure};

/// Orchestrates one preflight run over a plan.
pub struct PreflightOrchestrator {
    /// High-risk resource selection.
    classifier: ResourceClassifier,
    /// Template synthesis.
    synthesizer: TemplateSynthesizer,
    /// Dry-run validation capability.
    client: Arc<dyn ValidationClient>,
    /// Maximum in-flight validate calls. 1 = sequential (the default).
    concurrency: usize,
}

/// One selected resource, ready for validation.
struct WorkItem {
    /// Plan address.
    address: String,
    /// Diagnostic context from the plan, independent of the template.
    context: DiagnosticContext,
    /// Synthesized deployment template.
    template: ArmTemplate,
}

impl PreflightOrchestrator {
    /// Creates an orchestrator with sequential execution and default
    /// synthesis settings.
    #[must_use]
    pub fn new(client: Arc<dyn ValidationClient>) -> Self {
        Self {
            classifier: ResourceClassifier::new(),
            synthesizer: TemplateSynthesizer::default(),
            client,
            concurrency: 1,
        }
    }

    /// Replaces the template synthesizer.
    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: TemplateSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Sets the maximum number of in-flight validate calls.
    ///
    /// Values below 1 are treated as 1 (sequential).
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = if concurrency == 0 { 1 } else { concurrency };
        self
    }

    /// Runs the preflight over the plan.
    ///
    /// Every selected resource is accounted for exactly once: it either
    /// passes silently or appears in the failure sequence, which preserves
    /// plan order regardless of the execution strategy.
    ///
    /// # Errors
    ///
    /// Returns an error on a missing synthesis rule for a selected resource
    /// (a tooling gap, fatal for the whole run) and on credential failures
    /// (no verdict is obtainable). Provider rejections and per-call
    /// transport failures are recorded in the report instead.
    pub async fn run(
        &self,
        plan: &PlanDocument,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<PreflightReport> {
        // Synthesis happens up front, in plan order: a missing rule aborts
        // the run before a single call is issued.
        let mut items = Vec::new();
        for change in &plan.resource_changes {
            if !self.classifier.is_in_scope(change) {
                debug!("Skipping {} (not in scope)", change.address);
                continue;
            }

            let template = self.synthesizer.synthesize(change)?;
            let context =
                DiagnosticContext::from_change(change, self.synthesizer.default_location());
            items.push(WorkItem {
                address: change.address.clone(),
                context,
                template,
            });
        }

        info!(
            "Selected {} of {} resource changes for validation",
            items.len(),
            plan.resource_changes.len()
        );

        if items.is_empty() {
            return Ok(PreflightReport::new(0, vec![]));
        }

        let failures = if self.concurrency <= 1 {
            self.validate_sequential(&items, subscription_id, resource_group)
                .await?
        } else {
            self.validate_parallel(&items, subscription_id, resource_group)
                .await?
        };

        Ok(PreflightReport::new(items.len(), failures))
    }

    /// Validates items one at a time, in plan order.
    async fn validate_sequential(
        &self,
        items: &[WorkItem],
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<ResourceFailure>> {
        let mut failures = Vec::new();

        for item in items {
            let result = self
                .client
                .validate(
                    subscription_id,
                    resource_group,
                    &item.context.location,
                    &item.template,
                )
                .await;

            if let Some(failure) = Self::failure_from(item, result)? {
                failures.push(failure);
            }
        }

        Ok(failures)
    }

    /// Validates items concurrently under the configured limit, then
    /// re-assembles results in plan order.
    async fn validate_parallel(
        &self,
        items: &[WorkItem],
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<ResourceFailure>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<(usize, Result<ValidationOutcome>)> = JoinSet::new();

        for (index, item) in items.iter().enumerate() {
            let client = Arc::clone(&self.client);
            let limiter = Arc::clone(&semaphore);
            let subscription = subscription_id.to_string();
            let group = resource_group.to_string();
            let location = item.context.location.clone();
            let template = item.template.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails
                // on shutdown; the permit is held for the whole call.
                let _permit = limiter.acquire_owned().await.ok();
                let outcome = client
                    .validate(&subscription, &group, &location, &template)
                    .await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<Result<ValidationOutcome>>> =
            (0..items.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined
                .map_err(|e| CloudgateError::internal(format!("Validation task failed: {e}")))?;
            slots[index] = Some(result);
        }

        let mut failures = Vec::new();
        for (item, slot) in items.iter().zip(slots) {
            let result = slot
                .ok_or_else(|| CloudgateError::internal("Missing validation result for item"))?;
            if let Some(failure) = Self::failure_from(item, result)? {
                failures.push(failure);
            }
        }

        Ok(failures)
    }

    /// Classifies one validation result into a recorded failure, a silent
    /// pass, or a run-aborting error.
    fn failure_from(
        item: &WorkItem,
        result: Result<ValidationOutcome>,
    ) -> Result<Option<ResourceFailure>> {
        match result {
            Ok(outcome) if outcome.accepted => {
                debug!("{} passed validation", item.address);
                Ok(None)
            }
            Ok(outcome) => {
                let error = outcome.error.unwrap_or_else(|| {
                    ArmErrorDetail::from_payload(serde_json::json!({
                        "code": "Unknown",
                        "message": "Provider rejected the deployment without detail",
                    }))
                });
                warn!("{} rejected by provider", item.address);
                Ok(Some(ResourceFailure {
                    address: item.address.clone(),
                    context: item.context.clone(),
                    kind: FailureKind::Rejected(error),
                }))
            }
            Err(e) if e.is_transport() => {
                warn!("{} could not be validated: {e}", item.address);
                Ok(Some(ResourceFailure {
                    address: item.address.clone(),
                    context: item.context.clone(),
                    kind: FailureKind::Transport(e.to_string()),
                }))
            }
            // Credential failures and internal errors: no honest verdict is
            // possible for anything, abort the run.
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AzureError;
    use crate::plan::PlanParser;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// What the scripted client should do for one template name.
    #[derive(Debug, Clone)]
    enum Script {
        Reject(&'static str),
        Transport,
        Auth,
    }

    /// Deterministic fake returning scripted outcomes per descriptor.
    /// Unscripted descriptors are accepted.
    #[derive(Default)]
    struct ScriptedClient {
        scripts: HashMap<String, Script>,
        delays_ms: HashMap<String, u64>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn script(mut self, template_name: &str, script: Script) -> Self {
            self.scripts.insert(template_name.to_string(), script);
            self
        }

        fn delay(mut self, template_name: &str, millis: u64) -> Self {
            self.delays_ms.insert(template_name.to_string(), millis);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ValidationClient for ScriptedClient {
        async fn validate(
            &self,
            _subscription_id: &str,
            _resource_group: &str,
            location: &str,
            template: &ArmTemplate,
        ) -> Result<ValidationOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = template.resources[0].name.clone();

            if let Some(millis) = self.delays_ms.get(&name) {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }

            match self.scripts.get(&name) {
                None => Ok(ValidationOutcome::ok(location)),
                Some(Script::Reject(code)) => Ok(ValidationOutcome::rejected(
                    location,
                    ArmErrorDetail::from_payload(serde_json::json!({
                        "error": { "code": code, "message": "scripted rejection" }
                    })),
                )),
                Some(Script::Transport) => Err(CloudgateError::Azure(AzureError::network(
                    "connection reset by peer",
                ))),
                Some(Script::Auth) => {
                    Err(CloudgateError::Azure(AzureError::AuthenticationFailed {
                        message: String::from("token expired"),
                    }))
                }
            }
        }
    }

    fn plan(changes: &str) -> PlanDocument {
        PlanParser::new()
            .parse_json(&format!(r#"{{ "resource_changes": {changes} }}"#), None)
            .expect("valid plan")
    }

    fn orchestrator(client: Arc<ScriptedClient>) -> PreflightOrchestrator {
        PreflightOrchestrator::new(client)
    }

    #[tokio::test]
    async fn test_empty_scope_passes_with_zero_calls() {
        let client = Arc::new(ScriptedClient::default());
        let plan = plan(
            r#"[
                {
                    "address": "azurerm_storage_account.logs",
                    "type": "azurerm_storage_account",
                    "change": { "actions": ["create"], "after": {} }
                },
                {
                    "address": "azurerm_lb.edge",
                    "type": "azurerm_lb",
                    "change": { "actions": ["delete"], "after": null }
                }
            ]"#,
        );

        let report = orchestrator(Arc::clone(&client))
            .run(&plan, "sub-1", "preflight-rg")
            .await
            .expect("report");

        assert!(report.passed());
        assert_eq!(report.evaluated, 0);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejection_is_recorded_once_and_fails_the_run() {
        let client = Arc::new(
            ScriptedClient::default()
                .script("azurerm_firewall-main", Script::Reject("SkuNotAvailable")),
        );
        let plan = plan(
            r#"[
                {
                    "address": "azurerm_firewall.main",
                    "type": "azurerm_firewall",
                    "change": {
                        "actions": ["create"],
                        "after": { "location": "westus", "sku_name": "AZFW_Hub" }
                    }
                },
                {
                    "address": "azurerm_lb.edge",
                    "type": "azurerm_lb",
                    "change": { "actions": ["create"], "after": { "location": "westus" } }
                }
            ]"#,
        );

        let report = orchestrator(Arc::clone(&client))
            .run(&plan, "sub-1", "preflight-rg")
            .await
            .expect("report");

        assert!(!report.passed());
        assert_eq!(report.evaluated, 2);
        assert_eq!(client.call_count(), 2);
        assert_eq!(report.failures.len(), 1);

        let failure = &report.failures[0];
        assert_eq!(failure.address, "azurerm_firewall.main");
        assert_eq!(failure.context.location, "westus");
        assert_eq!(failure.context.sku, "AZFW_Hub");
        match &failure.kind {
            FailureKind::Rejected(error) => {
                assert_eq!(error.code.as_deref(), Some("SkuNotAvailable"));
            }
            FailureKind::Transport(_) => panic!("expected a provider rejection"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_tagged_and_run_continues() {
        let client = Arc::new(
            ScriptedClient::default().script("azurerm_firewall-main", Script::Transport),
        );
        let plan = plan(
            r#"[
                {
                    "address": "azurerm_firewall.main",
                    "type": "azurerm_firewall",
                    "change": { "actions": ["create"], "after": { "location": "westus" } }
                },
                {
                    "address": "azurerm_bastion_host.jump",
                    "type": "azurerm_bastion_host",
                    "change": { "actions": ["create"], "after": { "location": "westus" } }
                }
            ]"#,
        );

        let report = orchestrator(Arc::clone(&client))
            .run(&plan, "sub-1", "preflight-rg")
            .await
            .expect("report");

        // Both resources were evaluated; only the transport failure shows.
        assert_eq!(client.call_count(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].is_transport());
        assert_eq!(report.rejection_count(), 0);
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn test_credential_failure_aborts_the_run() {
        let client =
            Arc::new(ScriptedClient::default().script("azurerm_firewall-main", Script::Auth));
        let plan = plan(
            r#"[
                {
                    "address": "azurerm_firewall.main",
                    "type": "azurerm_firewall",
                    "change": { "actions": ["create"], "after": { "location": "westus" } }
                }
            ]"#,
        );

        let err = orchestrator(client)
            .run(&plan, "sub-1", "preflight-rg")
            .await
            .expect_err("auth failure");
        assert!(err.is_credential());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_execution_preserves_plan_order() {
        // The first resource is the slowest: completion order is the
        // reverse of plan order, the report must still follow the plan.
        let client = Arc::new(
            ScriptedClient::default()
                .script("azurerm_firewall-main", Script::Reject("SkuNotAvailable"))
                .script("azurerm_lb-edge", Script::Reject("ZoneMismatch"))
                .script("azurerm_bastion_host-jump", Script::Reject("InvalidTemplate"))
                .delay("azurerm_firewall-main", 80)
                .delay("azurerm_lb-edge", 40),
        );
        let plan = plan(
            r#"[
                {
                    "address": "azurerm_firewall.main",
                    "type": "azurerm_firewall",
                    "change": { "actions": ["create"], "after": { "location": "westus" } }
                },
                {
                    "address": "azurerm_lb.edge",
                    "type": "azurerm_lb",
                    "change": { "actions": ["update"], "after": { "location": "westus" } }
                },
                {
                    "address": "azurerm_bastion_host.jump",
                    "type": "azurerm_bastion_host",
                    "change": { "actions": ["create"], "after": { "location": "westus" } }
                }
            ]"#,
        );

        let report = orchestrator(Arc::clone(&client))
            .with_concurrency(4)
            .run(&plan, "sub-1", "preflight-rg")
            .await
            .expect("report");

        let addresses: Vec<_> = report.failures.iter().map(|f| f.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec![
                "azurerm_firewall.main",
                "azurerm_lb.edge",
                "azurerm_bastion_host.jump"
            ]
        );
    }
}
