use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::error::{NavigationError, Result};
use crate::ids::UniqueIdProvider;
use crate::layout::{LayoutNode, LayoutTransform, RootLayout};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::NavigationMetrics;

use super::native::{NativeCommandsSender, NativeResult};
use super::observer::{CommandLayout, CommandPayload, CommandsObserver};

pub const COMMANDS_TARGET: &str = "navbridge::commands";

/// Turns navigation requests into native commands.
///
/// Each operation copies its input into owned values, runs it through the layout transform,
/// mints a correlation id, calls the native sender once, and then notifies the
/// [`CommandsObserver`] once. A transform failure aborts before any of the
/// last three steps happen.
pub struct Commands {
    sender: Arc<dyn NativeCommandsSender>,
    transform: Arc<dyn LayoutTransform>,
    observer: CommandsObserver,
    ids: Arc<UniqueIdProvider>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<NavigationMetrics>>>,
}

impl Commands {
    pub fn new(
        sender: Arc<dyn NativeCommandsSender>,
        transform: Arc<dyn LayoutTransform>,
        observer: CommandsObserver,
        ids: Arc<UniqueIdProvider>,
    ) -> Self {
        Self {
            sender,
            transform,
            observer,
            ids,
            logger: None,
            metrics: None,
        }
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Mutex<NavigationMetrics>>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn observer(&self) -> &CommandsObserver {
        &self.observer
    }

    /// `simple_api` is `{ root, modals?, overlays? }`.
    pub fn set_root(&self, simple_api: &Value) -> Result<Value> {
        let root = simple_api
            .get("root")
            .ok_or_else(|| NavigationError::transform("setRoot requires a root layout"))?;
        let root = self.layout(root)?;
        let modals = self.layout_list(simple_api, "modals")?;
        let overlays = self.layout_list(simple_api, "overlays")?;
        let layout = RootLayout {
            root,
            modals,
            overlays,
        };

        let command_id = self.ids.generate("setRoot");
        let result = self.sender.set_root(&command_id, &layout);
        let payload = CommandPayload::new(command_id).with_layout(CommandLayout::Root(layout));
        self.finish("setRoot", payload, result)
    }

    pub fn set_default_options(&self, options: &Value) -> Result<()> {
        let options = self.options(options)?;
        let command_id = self.ids.generate("setDefaultOptions");
        let result = self.sender.set_default_options(&command_id, &options);
        let payload = CommandPayload::new(command_id).with_options(options);
        self.finish("setDefaultOptions", payload, result)
    }

    pub fn merge_options(&self, component_id: &str, options: &Value) -> Result<()> {
        let options = self.options(options)?;
        let command_id = self.ids.generate("mergeOptions");
        let result = self
            .sender
            .merge_options(&command_id, component_id, &options);
        let payload = CommandPayload::new(command_id)
            .with_component_id(component_id)
            .with_options(options);
        self.finish("mergeOptions", payload, result)
    }

    pub fn show_modal(&self, layout: &Value) -> Result<Value> {
        let layout = self.layout(layout)?;
        let command_id = self.ids.generate("showModal");
        let result = self.sender.show_modal(&command_id, &layout);
        let payload = CommandPayload::new(command_id).with_layout(CommandLayout::Node(layout));
        self.finish("showModal", payload, result)
    }

    pub fn dismiss_modal(&self, component_id: &str) -> Result<Value> {
        let command_id = self.ids.generate("dismissModal");
        let result = self.sender.dismiss_modal(&command_id, component_id);
        let payload = CommandPayload::new(command_id).with_component_id(component_id);
        self.finish("dismissModal", payload, result)
    }

    pub fn dismiss_all_modals(&self) -> Result<Value> {
        let command_id = self.ids.generate("dismissAllModals");
        let result = self.sender.dismiss_all_modals(&command_id);
        self.finish("dismissAllModals", CommandPayload::new(command_id), result)
    }

    pub fn push(&self, component_id: &str, layout: &Value) -> Result<Value> {
        let layout = self.layout(layout)?;
        let command_id = self.ids.generate("push");
        let result = self.sender.push(&command_id, component_id, &layout);
        let payload = CommandPayload::new(command_id)
            .with_component_id(component_id)
            .with_layout(CommandLayout::Node(layout));
        self.finish("push", payload, result)
    }

    pub fn pop(&self, component_id: &str, options: Option<&Value>) -> Result<Value> {
        let options = options.map(|options| self.options(options)).transpose()?;
        let command_id = self.ids.generate("pop");
        let result = self
            .sender
            .pop(&command_id, component_id, options.as_ref());
        let mut payload = CommandPayload::new(command_id).with_component_id(component_id);
        payload.options = options;
        self.finish("pop", payload, result)
    }

    pub fn pop_to(&self, component_id: &str) -> Result<Value> {
        let command_id = self.ids.generate("popTo");
        let result = self.sender.pop_to(&command_id, component_id);
        let payload = CommandPayload::new(command_id).with_component_id(component_id);
        self.finish("popTo", payload, result)
    }

    pub fn pop_to_root(&self, component_id: &str) -> Result<Value> {
        let command_id = self.ids.generate("popToRoot");
        let result = self.sender.pop_to_root(&command_id, component_id);
        let payload = CommandPayload::new(command_id).with_component_id(component_id);
        self.finish("popToRoot", payload, result)
    }

    pub fn set_stack_root(&self, component_id: &str, layout: &Value) -> Result<Value> {
        let layout = self.layout(layout)?;
        let command_id = self.ids.generate("setStackRoot");
        let result = self
            .sender
            .set_stack_root(&command_id, component_id, &layout);
        let payload = CommandPayload::new(command_id)
            .with_component_id(component_id)
            .with_layout(CommandLayout::Node(layout));
        self.finish("setStackRoot", payload, result)
    }

    pub fn show_overlay(&self, layout: &Value) -> Result<Value> {
        let layout = self.layout(layout)?;
        let command_id = self.ids.generate("showOverlay");
        let result = self.sender.show_overlay(&command_id, &layout);
        let payload = CommandPayload::new(command_id).with_layout(CommandLayout::Node(layout));
        self.finish("showOverlay", payload, result)
    }

    pub fn dismiss_overlay(&self, component_id: &str) -> Result<Value> {
        let command_id = self.ids.generate("dismissOverlay");
        let result = self.sender.dismiss_overlay(&command_id, component_id);
        let payload = CommandPayload::new(command_id).with_component_id(component_id);
        self.finish("dismissOverlay", payload, result)
    }

    pub fn get_launch_args(&self) -> Result<Value> {
        let command_id = self.ids.generate("getLaunchArgs");
        let result = self.sender.get_launch_args(&command_id);
        self.finish("getLaunchArgs", CommandPayload::new(command_id), result)
    }

    // `parse` copies what it keeps, so the caller's value is never touched.
    fn layout(&self, raw: &Value) -> Result<LayoutNode> {
        let mut node = self.transform.parse(raw)?;
        self.transform.crawl(&mut node)?;
        Ok(node)
    }

    fn layout_list(&self, input: &Value, key: &str) -> Result<Vec<LayoutNode>> {
        match input.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|item| self.layout(item)).collect(),
            Some(_) => Err(NavigationError::transform(format!(
                "setRoot {key} must be an array"
            ))),
        }
    }

    fn options(&self, raw: &Value) -> Result<Value> {
        let mut input = raw.clone();
        self.transform.process_options(&mut input)?;
        Ok(input)
    }

    fn finish<T>(&self, name: &str, payload: CommandPayload, result: NativeResult<T>) -> Result<T> {
        self.observer.notify(name, &payload);
        self.record_command(result.is_ok());

        match &result {
            Ok(_) => self.log(
                LogLevel::Debug,
                "command_dispatched",
                name,
                &payload.command_id,
                None,
            ),
            Err(err) => self.log(
                LogLevel::Warn,
                "command_failed",
                name,
                &payload.command_id,
                Some(err.to_string()),
            ),
        }

        result.map_err(NavigationError::from)
    }

    fn record_command(&self, succeeded: bool) {
        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_command(succeeded);
            }
        }
    }

    fn log(
        &self,
        level: LogLevel,
        message: &str,
        command: &str,
        command_id: &str,
        error: Option<String>,
    ) {
        if let Some(logger) = self.logger.as_ref() {
            let mut fields = vec![
                json_kv("command", json!(command)),
                json_kv("command_id", json!(command_id)),
            ];
            if let Some(error) = error {
                fields.push(json_kv("error", json!(error)));
            }
            let _ = logger.log_event(event_with_fields(level, COMMANDS_TARGET, message, fields));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutTreeTransform;
    use crate::logging::{LogEvent, LogSink, LoggingError, LoggingResult, MemorySink};
    use crate::testing::{CallLog, RecordingSender};

    struct Harness {
        commands: Commands,
        sender: RecordingSender,
        observed: Arc<Mutex<Vec<(String, CommandPayload)>>>,
        log: CallLog,
    }

    fn harness() -> Harness {
        let log = CallLog::new();
        let sender = RecordingSender::with_log(log.clone());
        let ids = Arc::new(UniqueIdProvider::new());
        let observer = CommandsObserver::new();
        let observed = Arc::new(Mutex::new(Vec::new()));
        {
            let observed = observed.clone();
            let log = log.clone();
            observer.register(move |name, payload| {
                log.push(format!("observer:{name}"));
                observed
                    .lock()
                    .unwrap()
                    .push((name.to_string(), payload.clone()));
            });
        }
        let commands = Commands::new(
            Arc::new(sender.clone()),
            Arc::new(LayoutTreeTransform::new(ids.clone())),
            observer,
            ids,
        );
        Harness {
            commands,
            sender,
            observed,
            log,
        }
    }

    fn screen(name: &str) -> Value {
        json!({"component": {"name": name}})
    }

    #[test]
    fn push_dispatches_then_notifies() {
        let h = harness();
        let reply = h.commands.push("compA", &screen("Details")).unwrap();

        let sent = h.sender.last().unwrap();
        assert_eq!(sent.name, "push");
        assert!(sent.command_id.starts_with("push"));
        assert_eq!(sent.component_id.as_deref(), Some("compA"));
        let layout = sent.layout.unwrap();
        assert_eq!(layout["data"]["name"], json!("Details"));
        assert!(layout["id"].as_str().unwrap().starts_with("Component"));
        assert_eq!(reply, json!({"commandId": sent.command_id}));

        let observed = h.observed.lock().unwrap();
        assert_eq!(observed.len(), 1);
        let (name, payload) = &observed[0];
        assert_eq!(name, "push");
        assert_eq!(payload.command_id, sent.command_id);
        assert_eq!(payload.component_id.as_deref(), Some("compA"));
        match &payload.layout {
            Some(CommandLayout::Node(node)) => assert_eq!(serde_json::to_value(node).unwrap(), layout),
            other => panic!("unexpected layout: {other:?}"),
        }
        assert_eq!(h.log.entries(), vec!["native:push", "observer:push"]);
    }

    #[test]
    fn caller_mutation_after_dispatch_is_not_observed() {
        let h = harness();
        let mut input = json!({"component": {"name": "Original", "passProps": {"n": 1}}});
        h.commands.show_modal(&input).unwrap();
        input["component"]["name"] = json!("Mutated");
        input["component"]["passProps"]["n"] = json!(2);

        let sent = h.sender.last().unwrap().layout.unwrap();
        assert_eq!(sent["data"]["name"], json!("Original"));
        assert_eq!(sent["data"]["passProps"]["n"], json!(1));
        let observed = h.observed.lock().unwrap();
        match &observed[0].1.layout {
            Some(CommandLayout::Node(node)) => {
                assert_eq!(node.data.name.as_deref(), Some("Original"));
            }
            other => panic!("unexpected layout: {other:?}"),
        }
    }

    #[test]
    fn set_root_input_is_copied_on_entry() {
        let h = harness();
        let mut input = json!({"root": screen("Home"), "modals": [screen("Login")]});
        h.commands.set_root(&input).unwrap();
        input["root"]["component"]["name"] = json!("Changed");
        input["modals"][0]["component"]["name"] = json!("Changed");

        let sent = h.sender.last().unwrap().layout.unwrap();
        assert_eq!(sent["root"]["data"]["name"], json!("Home"));
        assert_eq!(sent["modals"][0]["data"]["name"], json!("Login"));
    }

    #[test]
    fn failing_log_sink_does_not_break_dispatch() {
        struct BrokenSink;

        impl LogSink for BrokenSink {
            fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
                Err(LoggingError::Io(std::io::Error::other("disk full")))
            }
        }

        let h = harness();
        let commands = h.commands.with_logger(Some(Logger::new(BrokenSink)));
        let reply = commands.pop_to_root("comp").unwrap();
        assert_eq!(reply["commandId"], json!(h.sender.last().unwrap().command_id));
    }

    #[test]
    fn transform_failure_issues_nothing() {
        let h = harness();
        let err = h
            .commands
            .push("compA", &json!({"unknown": {}}))
            .unwrap_err();
        assert!(matches!(err, NavigationError::Transform(_)));

        let err = h
            .commands
            .merge_options("compA", &json!({"topBar": {"backgroundColor": "nope"}}))
            .unwrap_err();
        assert!(matches!(err, NavigationError::Transform(_)));

        assert!(h.sender.sent().is_empty());
        assert!(h.observed.lock().unwrap().is_empty());
    }

    #[test]
    fn native_failure_is_observed_and_propagated() {
        let h = harness();
        h.sender.fail_on("dismissModal", "no modal");

        let err = h.commands.dismiss_modal("modal1").unwrap_err();
        match err {
            NavigationError::Native(native) => {
                assert_eq!(native.command, "dismissModal");
                assert_eq!(native.message, "no modal");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.log.entries(), vec!["native:dismissModal", "observer:dismissModal"]);
    }

    #[test]
    fn every_operation_sends_once_and_notifies_once() {
        let h = harness();
        let c = &h.commands;
        c.set_root(&json!({"root": screen("Root")})).unwrap();
        c.set_default_options(&json!({"topBar": {"visible": false}})).unwrap();
        c.merge_options("comp", &json!({"topBar": {"visible": true}})).unwrap();
        c.show_modal(&screen("Modal")).unwrap();
        c.dismiss_modal("comp").unwrap();
        c.dismiss_all_modals().unwrap();
        c.push("comp", &screen("Pushed")).unwrap();
        c.pop("comp", None).unwrap();
        c.pop_to("comp").unwrap();
        c.pop_to_root("comp").unwrap();
        c.set_stack_root("comp", &screen("NewRoot")).unwrap();
        c.show_overlay(&screen("Overlay")).unwrap();
        c.dismiss_overlay("comp").unwrap();
        c.get_launch_args().unwrap();

        let expected = [
            "setRoot",
            "setDefaultOptions",
            "mergeOptions",
            "showModal",
            "dismissModal",
            "dismissAllModals",
            "push",
            "pop",
            "popTo",
            "popToRoot",
            "setStackRoot",
            "showOverlay",
            "dismissOverlay",
            "getLaunchArgs",
        ];
        let sent: Vec<String> = h.sender.sent().into_iter().map(|c| c.name).collect();
        assert_eq!(sent, expected);
        let observed: Vec<String> = h
            .observed
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        assert_eq!(observed, expected);

        let ids: std::collections::HashSet<String> =
            h.sender.sent().into_iter().map(|c| c.command_id).collect();
        assert_eq!(ids.len(), expected.len());
    }

    #[test]
    fn set_root_parses_modals_and_overlays() {
        let h = harness();
        h.commands
            .set_root(&json!({
                "root": {"stack": {"children": [screen("Home")]}},
                "modals": [screen("Login")],
                "overlays": [screen("Toast")]
            }))
            .unwrap();

        let layout = h.sender.last().unwrap().layout.unwrap();
        assert_eq!(layout["root"]["type"], json!("Stack"));
        assert_eq!(layout["modals"][0]["data"]["name"], json!("Login"));
        assert_eq!(layout["overlays"][0]["data"]["name"], json!("Toast"));

        assert!(matches!(
            h.commands.set_root(&json!({"modals": []})),
            Err(NavigationError::Transform(_))
        ));
        assert!(matches!(
            h.commands
                .set_root(&json!({"root": screen("A"), "overlays": {}})),
            Err(NavigationError::Transform(_))
        ));
        assert_eq!(h.sender.sent().len(), 1);
    }

    #[test]
    fn options_are_processed_before_dispatch() {
        let h = harness();
        let input = json!({"topBar": {"backgroundColor": "#00ff00"}});
        h.commands.merge_options("comp", &input).unwrap();
        h.commands.pop("comp", Some(&input)).unwrap();

        for sent in h.sender.sent() {
            assert_eq!(
                sent.options.unwrap()["topBar"]["backgroundColor"],
                json!(0xFF00_FF00u32)
            );
        }
        assert_eq!(input["topBar"]["backgroundColor"], json!("#00ff00"));
        let observed = h.observed.lock().unwrap();
        assert_eq!(
            observed[0].1.options.as_ref().unwrap()["topBar"]["backgroundColor"],
            json!(0xFF00_FF00u32)
        );
    }

    #[test]
    fn diagnostics_track_outcomes() {
        let sink = MemorySink::new();
        let metrics = Arc::new(Mutex::new(NavigationMetrics::new()));
        let sender = RecordingSender::new();
        sender.fail_on("popTo", "missing");
        let ids = Arc::new(UniqueIdProvider::new());
        let commands = Commands::new(
            Arc::new(sender),
            Arc::new(LayoutTreeTransform::new(ids.clone())),
            CommandsObserver::new(),
            ids,
        )
        .with_logger(Some(Logger::new(sink.clone())))
        .with_metrics(Some(metrics.clone()));

        commands.dismiss_all_modals().unwrap();
        assert!(commands.pop_to("screen").is_err());

        let snapshot = metrics.lock().unwrap().snapshot(std::time::Duration::ZERO);
        assert_eq!(snapshot.commands, 2);
        assert_eq!(snapshot.command_failures, 1);
        assert_eq!(sink.messages(), vec!["command_dispatched", "command_failed"]);
        assert_eq!(sink.events()[1].level, LogLevel::Warn);
    }
}
