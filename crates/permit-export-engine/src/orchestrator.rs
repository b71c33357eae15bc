//! Export orchestration
//!
//! Runs the generators strictly in order, one at a time, appending each
//! stage's output below the preamble. The first failing stage aborts the
//! export; no partial document is returned.

use crate::error::ExportError;
use crate::generator::{default_generators, ExportStage, Generator, GeneratorContext};
use crate::preamble::{render_preamble, ExportOptions};
use permit_export_core::{ExportScope, GeneratedDocument, WarningCollector};
use permit_export_state::PolicyStateClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Where an export currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Running(ExportStage),
    Done,
    Failed(ExportStage),
}

/// Progress notification published to an [`ExportObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportProgress {
    pub status: ExportStatus,
    pub message: String,
}

impl ExportProgress {
    fn running(generator: &dyn Generator) -> Self {
        Self {
            status: ExportStatus::Running(generator.stage()),
            message: format!("Exporting {}...", generator.name()),
        }
    }

    fn failed(stage: ExportStage) -> Self {
        Self {
            status: ExportStatus::Failed(stage),
            message: format!("Failed to export {}", stage),
        }
    }

    fn done() -> Self {
        Self {
            status: ExportStatus::Done,
            message: "Export complete".to_string(),
        }
    }
}

/// Receives progress notifications
pub trait ExportObserver: Send + Sync {
    fn on_progress(&self, progress: &ExportProgress);
}

impl<F> ExportObserver for F
where
    F: Fn(&ExportProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &ExportProgress) {
        self(progress)
    }
}

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub document: GeneratedDocument,

    /// Warnings in the order they were recorded
    pub warnings: Vec<String>,
}

/// Drives the generation stages for one client
pub struct ExportOrchestrator {
    client: Arc<dyn PolicyStateClient>,
    options: ExportOptions,
    observer: Option<Arc<dyn ExportObserver>>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl ExportOrchestrator {
    pub fn new(client: Arc<dyn PolicyStateClient>, options: ExportOptions) -> Self {
        Self {
            client,
            options,
            observer: None,
            cancelled: None,
        }
    }

    /// Publish progress to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ExportObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Stop before the next stage once `flag` is set
    ///
    /// A stage that has already started always runs to completion.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    /// Export the live state of `scope` with the eight default generators
    pub async fn export(&self, api_key: &str, scope: &ExportScope) -> Result<ExportOutcome, ExportError> {
        self.run(default_generators, api_key, scope).await
    }

    /// Export with generators built by `build`
    ///
    /// `build` receives the context of this export; the returned outcome
    /// carries every warning recorded through it.
    pub async fn run<F>(
        &self,
        build: F,
        api_key: &str,
        scope: &ExportScope,
    ) -> Result<ExportOutcome, ExportError>
    where
        F: FnOnce(&GeneratorContext) -> Vec<Box<dyn Generator>>,
    {
        validate(api_key, scope)?;

        let context = GeneratorContext::new(self.client.clone(), WarningCollector::new());
        let generators = build(&context);

        tracing::info!(
            client = self.client.name(),
            environment = scope.environment_label(),
            project = scope.project_label(),
            "Starting export"
        );

        let mut text = render_preamble(api_key, scope, &self.options);

        for generator in &generators {
            let stage = generator.stage();

            if self.is_cancelled() {
                tracing::info!(%stage, "Export cancelled");
                return Err(ExportError::Cancelled { stage });
            }

            self.publish(ExportProgress::running(&**generator));
            tracing::info!("Exporting {}...", generator.name());

            match generator.generate_hcl().await {
                Ok(Some(section)) => text.push_str(&section),
                Ok(None) => tracing::debug!(%stage, "Nothing to export"),
                Err(err) => {
                    tracing::error!(%stage, error = %err, "Export failed");
                    self.publish(ExportProgress::failed(stage));
                    return Err(err);
                }
            }
        }

        let document = GeneratedDocument::new(text);
        let warnings = context.warnings.drain();

        tracing::info!(
            bytes = document.as_str().len(),
            warnings = warnings.len(),
            "Export complete"
        );
        self.publish(ExportProgress::done());

        Ok(ExportOutcome { document, warnings })
    }

    fn publish(&self, progress: ExportProgress) {
        if let Some(observer) = &self.observer {
            observer.on_progress(&progress);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Inputs are checked once, before any stage runs
fn validate(api_key: &str, scope: &ExportScope) -> Result<(), ExportError> {
    if api_key.is_empty() {
        return Err(ExportError::Config("API key must not be empty".to_string()));
    }
    if api_key.chars().any(char::is_whitespace) {
        return Err(ExportError::Config(
            "API key must not contain whitespace".to_string(),
        ));
    }

    let fields = [
        ("environment", &scope.environment_id),
        ("project", &scope.project_id),
        ("organization", &scope.organization_id),
    ];
    for (field, value) in fields {
        if value.as_deref().is_some_and(|v| v.chars().any(char::is_control)) {
            return Err(ExportError::Config(format!(
                "{} identifier must not contain control characters",
                field
            )));
        }
    }

    Ok(())
}
