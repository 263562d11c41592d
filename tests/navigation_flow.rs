use std::sync::{Arc, Mutex};

use navbridge::logging::MemorySink;
use navbridge::testing::{CallLog, RecordingEventsReceiver, RecordingSender};
use navbridge::{
    CommandCompletedEvent, CommandLoggerListener, ComponentDidAppearEvent, Delivery, Logger,
    ModalDismissedEvent, Navigation, NavigationButtonPressedEvent, NavigationComponent,
    NavigationConfig, NavigationError, Props, SearchBarCancelPressedEvent,
};
use serde_json::json;

struct Screen {
    props: Props,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Screen {
    fn new(component_id: &str, seen: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        let mut props = Props::new();
        props.insert("componentId".to_string(), json!(component_id));
        Arc::new(Self {
            props,
            seen: seen.clone(),
        })
    }
}

impl NavigationComponent for Screen {
    fn props(&self) -> &Props {
        &self.props
    }

    fn component_did_appear(&self, event: &ComponentDidAppearEvent) -> Delivery {
        self.seen
            .lock()
            .unwrap()
            .push(format!("appear:{}", event.component_name));
        Delivery::Handled
    }

    fn navigation_button_pressed(&self, event: &NavigationButtonPressedEvent) -> Delivery {
        self.seen
            .lock()
            .unwrap()
            .push(format!("button:{}", event.button_id));
        Delivery::Handled
    }

    fn modal_dismissed(&self, event: &ModalDismissedEvent) -> Delivery {
        self.seen
            .lock()
            .unwrap()
            .push(format!("modal:{}", event.component_id));
        Delivery::Handled
    }
}

fn setup(config: NavigationConfig) -> (Navigation, RecordingSender, RecordingEventsReceiver, CallLog) {
    let log = CallLog::new();
    let sender = RecordingSender::with_log(log.clone());
    let receiver = RecordingEventsReceiver::new();
    let navigation = Navigation::new(
        Arc::new(sender.clone()),
        Arc::new(receiver.clone()),
        config,
    );
    (navigation, sender, receiver, log)
}

#[test]
fn launch_set_root_and_push_with_listeners() {
    let (nav, sender, receiver, log) = setup(NavigationConfig::default());

    let launched = Arc::new(Mutex::new(0));
    let counter = launched.clone();
    let _launch = nav
        .events()
        .register_app_launched_listener(move || *counter.lock().unwrap() += 1);

    let listener_log = log.clone();
    let _commands = nav
        .events()
        .register_command_listener(move |name, payload| {
            listener_log.push(format!("listener:{name}:{}", payload.command_id));
        });

    receiver.emit_app_launched();
    assert_eq!(*launched.lock().unwrap(), 1);

    nav.commands()
        .set_root(&json!({"root": {"stack": {"children": [{"component": {"name": "Home"}}]}}}))
        .unwrap();
    nav.commands()
        .push("Component2", &json!({"component": {"name": "Details"}}))
        .unwrap();

    let sent = sender.sent();
    assert_eq!(sent.len(), 2);
    let root = sent[0].layout.clone().unwrap();
    assert_eq!(root["root"]["id"], json!("Stack1"));
    assert_eq!(root["root"]["children"][0]["id"], json!("Component2"));
    assert_eq!(sent[0].command_id, "setRoot3");
    assert_eq!(sent[1].command_id, "push5");

    assert_eq!(
        log.entries(),
        vec![
            "native:setRoot",
            "listener:setRoot:setRoot3",
            "native:push",
            "listener:push:push5",
        ]
    );
}

#[test]
fn command_completion_correlates_with_issued_id() {
    let (nav, sender, receiver, _) = setup(NavigationConfig::default());
    let completed = Arc::new(Mutex::new(Vec::new()));
    let sink = completed.clone();
    let subscription = nav
        .events()
        .register_command_completed_listener(move |event| {
            sink.lock().unwrap().push(event.command_id.clone());
        });

    nav.commands().dismiss_all_modals().unwrap();
    let issued = sender.last().unwrap().command_id;
    receiver.emit_command_completed(&CommandCompletedEvent {
        command_id: issued.clone(),
        completion_time: 1_700_000_000_000,
    });
    subscription.remove();
    receiver.emit_command_completed(&CommandCompletedEvent {
        command_id: "late".to_string(),
        completion_time: 0,
    });

    assert_eq!(*completed.lock().unwrap(), vec![issued]);
}

#[test]
fn bound_component_receives_events_it_handles() {
    let (nav, _, receiver, _) = setup(NavigationConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let screen = Screen::new("comp-1", &seen);
    let other = Screen::new("comp-2", &seen);
    let binding = nav.events().bind_component(&screen).unwrap();
    let _other = nav.events().bind_component(&other).unwrap();

    receiver.emit_component_did_appear(&ComponentDidAppearEvent {
        component_id: "comp-1".to_string(),
        component_name: "Home".to_string(),
    });
    receiver.emit_modal_dismissed(&ModalDismissedEvent {
        component_id: "comp-1".to_string(),
    });
    receiver.emit_navigation_button_pressed(&NavigationButtonPressedEvent {
        component_id: "comp-2".to_string(),
        button_id: "save".to_string(),
    });

    receiver.emit_search_bar_cancel_pressed(&SearchBarCancelPressedEvent {
        component_id: "comp-1".to_string(),
    });

    binding.remove();
    receiver.emit_component_did_appear(&ComponentDidAppearEvent {
        component_id: "comp-1".to_string(),
        component_name: "Home".to_string(),
    });

    assert_eq!(*seen.lock().unwrap(), vec!["appear:Home", "modal:comp-1", "button:save"]);
}

#[test]
fn component_without_id_cannot_bind() {
    struct Anonymous(Props);
    impl NavigationComponent for Anonymous {
        fn props(&self) -> &Props {
            &self.0
        }
    }

    let (nav, _, _, _) = setup(NavigationConfig::default());
    let err = nav
        .events()
        .bind_component(&Arc::new(Anonymous(Props::new())))
        .unwrap_err();
    assert!(matches!(err, NavigationError::InvalidComponent(_)));
}

#[test]
fn diagnostics_flow_through_configured_logger() {
    let sink = MemorySink::new();
    let logger = Logger::new(sink.clone());
    let mut config = NavigationConfig::default().with_logger(logger.clone());
    config.enable_metrics();
    let (nav, sender, _, _) = setup(config);
    let _attached = CommandLoggerListener::new(logger).attach(nav.commands().observer());

    sender.fail_on("showOverlay", "host busy");
    let err = nav
        .commands()
        .show_overlay(&json!({"component": {"name": "Toast"}}))
        .unwrap_err();
    assert!(matches!(err, NavigationError::Native(_)));
    nav.emit_metrics();

    let messages = sink.messages();
    assert_eq!(
        messages,
        vec![
            "registered_for_component_events",
            "command_issued",
            "command_failed",
            "navigation_metrics",
        ]
    );
    let snapshot = nav.metrics_snapshot().unwrap();
    assert_eq!(snapshot.commands, 1);
    assert_eq!(snapshot.command_failures, 1);
}
