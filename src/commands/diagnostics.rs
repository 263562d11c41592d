use serde_json::{Value, json};

use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};

use super::observer::{CommandListenerHandle, CommandPayload, CommandsObserver};

pub const COMMAND_OBSERVER_TARGET: &str = "navbridge::commands.observer";

/// Logs every observed command for debugging and analytics pipelines.
#[derive(Clone)]
pub struct CommandLoggerListener {
    logger: Logger,
    level: LogLevel,
    include_layout: bool,
}

impl CommandLoggerListener {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            level: LogLevel::Debug,
            include_layout: false,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Layout trees can be large; they are left out unless asked for.
    pub fn include_layout(mut self, enabled: bool) -> Self {
        self.include_layout = enabled;
        self
    }

    pub fn attach(self, observer: &CommandsObserver) -> CommandListenerHandle {
        observer.register(move |name, payload| self.log_command(name, payload))
    }

    pub fn log_command(&self, name: &str, payload: &CommandPayload) {
        let mut fields = vec![
            json_kv("command", json!(name)),
            json_kv("command_id", json!(payload.command_id)),
        ];
        if let Some(component_id) = &payload.component_id {
            fields.push(json_kv("component_id", json!(component_id)));
        }
        if let Some(options) = &payload.options {
            fields.push(json_kv("options", options.clone()));
        }
        if let Some(layout) = &payload.layout {
            let value = if self.include_layout {
                serde_json::to_value(layout).unwrap_or(Value::Null)
            } else {
                json!(true)
            };
            fields.push(json_kv("layout", value));
        }

        let event = event_with_fields(self.level, COMMAND_OBSERVER_TARGET, "command_issued", fields);
        let _ = self.logger.log_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;

    #[test]
    fn logs_each_observed_command() {
        let sink = MemorySink::new();
        let observer = CommandsObserver::new();
        CommandLoggerListener::new(Logger::new(sink.clone())).attach(&observer);

        observer.notify(
            "dismissOverlay",
            &CommandPayload::new("dismissOverlay4").with_component_id("toast"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, COMMAND_OBSERVER_TARGET);
        assert_eq!(events[0].fields.get("command"), Some(&json!("dismissOverlay")));
        assert_eq!(events[0].fields.get("component_id"), Some(&json!("toast")));
    }

    #[test]
    fn respects_logger_floor() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone()).with_min_level(LogLevel::Info);
        let listener = CommandLoggerListener::new(logger);

        listener.log_command("pop", &CommandPayload::new("pop1"));
        assert!(sink.events().is_empty());

        listener
            .with_level(LogLevel::Info)
            .log_command("pop", &CommandPayload::new("pop2"));
        assert_eq!(sink.events().len(), 1);
    }
}
