//! Top-level wiring: one [`Navigation`] owns the id provider, layout
//! transform, command dispatcher, and event registries for an application.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;

use crate::commands::{Commands, CommandsObserver, NativeCommandsSender};
use crate::events::{ComponentEventsRegistry, EventsRegistry, NativeEventsReceiver};
use crate::ids::UniqueIdProvider;
use crate::layout::LayoutTreeTransform;
use crate::logging::{LogLevel, Logger};
use crate::metrics::{MetricSnapshot, NavigationMetrics};

pub const METRICS_TARGET: &str = "navbridge::metrics";

/// Runtime configuration shared by the command and event halves.
#[derive(Clone)]
pub struct NavigationConfig {
    /// Optional structured logger used for dispatch and delivery events.
    pub logger: Option<Logger>,
    /// Metrics accumulator updated on every command and event.
    pub metrics: Option<Arc<Mutex<NavigationMetrics>>>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            metrics_target: METRICS_TARGET.to_string(),
        }
    }
}

impl NavigationConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(NavigationMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<NavigationMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Application root. Construction registers the component event forwarders
/// with the native receiver exactly once.
pub struct Navigation {
    commands: Commands,
    events: EventsRegistry,
    layout: Arc<LayoutTreeTransform>,
    config: NavigationConfig,
    started: Instant,
}

impl Navigation {
    pub fn new(
        sender: Arc<dyn NativeCommandsSender>,
        receiver: Arc<dyn NativeEventsReceiver>,
        config: NavigationConfig,
    ) -> Self {
        let ids = Arc::new(UniqueIdProvider::new());
        let layout = Arc::new(LayoutTreeTransform::new(ids.clone()));
        let observer = CommandsObserver::new();

        let commands = Commands::new(sender, layout.clone(), observer.clone(), ids)
            .with_logger(config.logger.clone())
            .with_metrics(config.metrics_handle());

        let components = ComponentEventsRegistry::with_diagnostics(
            receiver.clone(),
            config.logger.clone(),
            config.metrics_handle(),
        );
        components.register_once_for_all_component_events();
        let events = EventsRegistry::new(receiver, observer, components);

        Self {
            commands,
            events,
            layout,
            config,
            started: Instant::now(),
        }
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    pub fn events(&self) -> &EventsRegistry {
        &self.events
    }

    pub fn component_events(&self) -> &ComponentEventsRegistry {
        self.events.components()
    }

    /// Options merged beneath every component named `component_name` when a
    /// layout containing it is crawled.
    pub fn register_default_options(&self, component_name: impl Into<String>, options: Value) {
        self.layout.register_default_options(component_name, options);
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.started.elapsed()))
    }

    /// Log the current metrics snapshot. No-op without both a logger and metrics.
    pub fn emit_metrics(&self) {
        let Some(logger) = self.config.logger.as_ref() else {
            return;
        };
        if !logger.enabled(LogLevel::Info) {
            return;
        }
        if let Some(snapshot) = self.metrics_snapshot() {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }
}
