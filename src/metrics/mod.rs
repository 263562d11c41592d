use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct NavigationMetrics {
    commands: u64,
    command_failures: u64,
    events_delivered: u64,
    events_unrouted: u64,
    bindings: u64,
}

impl NavigationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_command(&mut self, succeeded: bool) {
        self.commands = self.commands.saturating_add(1);
        if !succeeded {
            self.command_failures = self.command_failures.saturating_add(1);
        }
    }

    /// Record one notify pass; `delivered == 0` counts as unrouted.
    pub fn record_event(&mut self, delivered: usize) {
        if delivered == 0 {
            self.events_unrouted = self.events_unrouted.saturating_add(1);
        } else {
            self.events_delivered = self.events_delivered.saturating_add(delivered as u64);
        }
    }

    pub fn record_binding(&mut self) {
        self.bindings = self.bindings.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            commands: self.commands,
            command_failures: self.command_failures,
            events_delivered: self.events_delivered,
            events_unrouted: self.events_unrouted,
            bindings: self.bindings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub commands: u64,
    pub command_failures: u64,
    pub events_delivered: u64,
    pub events_unrouted: u64,
    pub bindings: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "navigation_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("commands".to_string(), json!(self.commands));
        map.insert("command_failures".to_string(), json!(self.command_failures));
        map.insert("events_delivered".to_string(), json!(self.events_delivered));
        map.insert("events_unrouted".to_string(), json!(self.events_unrouted));
        map.insert("bindings".to_string(), json!(self.bindings));
        map
    }
}
