//! Recording stand-ins for the native layer.
//!
//! `RecordingSender` captures every command instead of presenting anything and
//! `RecordingEventsReceiver` lets callers emit native events by hand. Both
//! can share a [`CallLog`] with other fakes so tests can assert ordering
//! across collaborators.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::commands::{NativeCommandsSender, NativeResult, NativeSenderError};
use crate::events::{
    AppLaunchedCallback, CommandCompletedEvent, ComponentDidAppearEvent,
    ComponentDidDisappearEvent, EmitterSubscription, EventCallback, ModalDismissedEvent,
    NativeEventsReceiver, NavigationButtonPressedEvent, SearchBarCancelPressedEvent,
    SearchBarUpdatedEvent,
};
use crate::layout::{LayoutNode, RootLayout};

/// Ordered list of `tag` strings shared between fakes.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(entry.into());
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// One command as received by [`RecordingSender`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentCommand {
    pub name: String,
    pub command_id: String,
    pub component_id: Option<String>,
    pub layout: Option<Value>,
    pub options: Option<Value>,
}

impl SentCommand {
    fn new(name: &str, command_id: &str) -> Self {
        Self {
            name: name.to_string(),
            command_id: command_id.to_string(),
            component_id: None,
            layout: None,
            options: None,
        }
    }
}

/// Native sender that records calls and answers with canned replies.
#[derive(Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<SentCommand>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
    log: CallLog,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Make every later call to `command` fail with `message`.
    pub fn fail_on(&self, command: &str, message: &str) {
        if let Ok(mut guard) = self.failures.lock() {
            guard.insert(command.to_string(), message.to_string());
        }
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<SentCommand> {
        self.sent().pop()
    }

    fn record(&self, command: SentCommand) -> NativeResult<Value> {
        self.log.push(format!("native:{}", command.name));
        let name = command.name.clone();
        let command_id = command.command_id.clone();
        if let Ok(mut guard) = self.sent.lock() {
            guard.push(command);
        }
        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|guard| guard.get(&name).cloned());
        match failure {
            Some(message) => Err(NativeSenderError::new(name, message)),
            None => Ok(json!({ "commandId": command_id })),
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

impl NativeCommandsSender for RecordingSender {
    fn set_root(&self, command_id: &str, layout: &RootLayout) -> NativeResult<Value> {
        let mut command = SentCommand::new("setRoot", command_id);
        command.layout = to_value(layout);
        self.record(command)
    }

    fn set_default_options(&self, command_id: &str, options: &Value) -> NativeResult<()> {
        let mut command = SentCommand::new("setDefaultOptions", command_id);
        command.options = Some(options.clone());
        self.record(command).map(|_| ())
    }

    fn merge_options(
        &self,
        command_id: &str,
        component_id: &str,
        options: &Value,
    ) -> NativeResult<()> {
        let mut command = SentCommand::new("mergeOptions", command_id);
        command.component_id = Some(component_id.to_string());
        command.options = Some(options.clone());
        self.record(command).map(|_| ())
    }

    fn show_modal(&self, command_id: &str, layout: &LayoutNode) -> NativeResult<Value> {
        let mut command = SentCommand::new("showModal", command_id);
        command.layout = to_value(layout);
        self.record(command)
    }

    fn dismiss_modal(&self, command_id: &str, component_id: &str) -> NativeResult<Value> {
        let mut command = SentCommand::new("dismissModal", command_id);
        command.component_id = Some(component_id.to_string());
        self.record(command)
    }

    fn dismiss_all_modals(&self, command_id: &str) -> NativeResult<Value> {
        self.record(SentCommand::new("dismissAllModals", command_id))
    }

    fn push(
        &self,
        command_id: &str,
        component_id: &str,
        layout: &LayoutNode,
    ) -> NativeResult<Value> {
        let mut command = SentCommand::new("push", command_id);
        command.component_id = Some(component_id.to_string());
        command.layout = to_value(layout);
        self.record(command)
    }

    fn pop(
        &self,
        command_id: &str,
        component_id: &str,
        options: Option<&Value>,
    ) -> NativeResult<Value> {
        let mut command = SentCommand::new("pop", command_id);
        command.component_id = Some(component_id.to_string());
        command.options = options.cloned();
        self.record(command)
    }

    fn pop_to(&self, command_id: &str, component_id: &str) -> NativeResult<Value> {
        let mut command = SentCommand::new("popTo", command_id);
        command.component_id = Some(component_id.to_string());
        self.record(command)
    }

    fn pop_to_root(&self, command_id: &str, component_id: &str) -> NativeResult<Value> {
        let mut command = SentCommand::new("popToRoot", command_id);
        command.component_id = Some(component_id.to_string());
        self.record(command)
    }

    fn set_stack_root(
        &self,
        command_id: &str,
        component_id: &str,
        layout: &LayoutNode,
    ) -> NativeResult<Value> {
        let mut command = SentCommand::new("setStackRoot", command_id);
        command.component_id = Some(component_id.to_string());
        command.layout = to_value(layout);
        self.record(command)
    }

    fn show_overlay(&self, command_id: &str, layout: &LayoutNode) -> NativeResult<Value> {
        let mut command = SentCommand::new("showOverlay", command_id);
        command.layout = to_value(layout);
        self.record(command)
    }

    fn dismiss_overlay(&self, command_id: &str, component_id: &str) -> NativeResult<Value> {
        let mut command = SentCommand::new("dismissOverlay", command_id);
        command.component_id = Some(component_id.to_string());
        self.record(command)
    }

    fn get_launch_args(&self, command_id: &str) -> NativeResult<Value> {
        self.record(SentCommand::new("getLaunchArgs", command_id))
    }
}

enum Listener {
    DidAppear(EventCallback<ComponentDidAppearEvent>),
    DidDisappear(EventCallback<ComponentDidDisappearEvent>),
    ButtonPressed(EventCallback<NavigationButtonPressedEvent>),
    ModalDismissed(EventCallback<ModalDismissedEvent>),
    SearchUpdated(EventCallback<SearchBarUpdatedEvent>),
    SearchCancel(EventCallback<SearchBarCancelPressedEvent>),
    AppLaunched(AppLaunchedCallback),
    CommandCompleted(EventCallback<CommandCompletedEvent>),
}

#[derive(Default)]
struct ReceiverState {
    next_token: u64,
    listeners: BTreeMap<u64, Listener>,
    registrations: HashMap<&'static str, usize>,
}

/// Native event source driven by hand. Counts registrations per event kind.
#[derive(Clone, Default)]
pub struct RecordingEventsReceiver {
    state: Arc<Mutex<ReceiverState>>,
}

impl RecordingEventsReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the listener for `kind` (e.g. `"componentDidAppear"`) was registered.
    pub fn registrations(&self, kind: &str) -> usize {
        self.state
            .lock()
            .ok()
            .and_then(|guard| guard.registrations.get(kind).copied())
            .unwrap_or(0)
    }

    /// Listeners currently attached, across all kinds.
    pub fn active_listeners(&self) -> usize {
        self.state
            .lock()
            .map(|guard| guard.listeners.len())
            .unwrap_or(0)
    }

    fn subscribe(&self, kind: &'static str, listener: Listener) -> EmitterSubscription {
        let token = match self.state.lock() {
            Ok(mut guard) => {
                *guard.registrations.entry(kind).or_insert(0) += 1;
                let token = guard.next_token;
                guard.next_token += 1;
                guard.listeners.insert(token, listener);
                token
            }
            Err(_) => return EmitterSubscription::new(|| {}),
        };
        let state = Arc::downgrade(&self.state);
        EmitterSubscription::new(move || {
            if let Some(state) = state.upgrade() {
                if let Ok(mut guard) = state.lock() {
                    guard.listeners.remove(&token);
                }
            }
        })
    }

    fn collect<T>(&self, select: impl Fn(&Listener) -> Option<T>) -> Vec<T> {
        self.state
            .lock()
            .map(|guard| guard.listeners.values().filter_map(&select).collect())
            .unwrap_or_default()
    }

    pub fn emit_component_did_appear(&self, event: &ComponentDidAppearEvent) {
        let callbacks = self.collect(|l| match l {
            Listener::DidAppear(cb) => Some(cb.clone()),
            _ => None,
        });
        callbacks.iter().for_each(|cb| cb(event));
    }

    pub fn emit_component_did_disappear(&self, event: &ComponentDidDisappearEvent) {
        let callbacks = self.collect(|l| match l {
            Listener::DidDisappear(cb) => Some(cb.clone()),
            _ => None,
        });
        callbacks.iter().for_each(|cb| cb(event));
    }

    pub fn emit_navigation_button_pressed(&self, event: &NavigationButtonPressedEvent) {
        let callbacks = self.collect(|l| match l {
            Listener::ButtonPressed(cb) => Some(cb.clone()),
            _ => None,
        });
        callbacks.iter().for_each(|cb| cb(event));
    }

    pub fn emit_modal_dismissed(&self, event: &ModalDismissedEvent) {
        let callbacks = self.collect(|l| match l {
            Listener::ModalDismissed(cb) => Some(cb.clone()),
            _ => None,
        });
        callbacks.iter().for_each(|cb| cb(event));
    }

    pub fn emit_search_bar_updated(&self, event: &SearchBarUpdatedEvent) {
        let callbacks = self.collect(|l| match l {
            Listener::SearchUpdated(cb) => Some(cb.clone()),
            _ => None,
        });
        callbacks.iter().for_each(|cb| cb(event));
    }

    pub fn emit_search_bar_cancel_pressed(&self, event: &SearchBarCancelPressedEvent) {
        let callbacks = self.collect(|l| match l {
            Listener::SearchCancel(cb) => Some(cb.clone()),
            _ => None,
        });
        callbacks.iter().for_each(|cb| cb(event));
    }

    pub fn emit_app_launched(&self) {
        let callbacks = self.collect(|l| match l {
            Listener::AppLaunched(cb) => Some(cb.clone()),
            _ => None,
        });
        callbacks.iter().for_each(|cb| cb());
    }

    pub fn emit_command_completed(&self, event: &CommandCompletedEvent) {
        let callbacks = self.collect(|l| match l {
            Listener::CommandCompleted(cb) => Some(cb.clone()),
            _ => None,
        });
        callbacks.iter().for_each(|cb| cb(event));
    }
}

impl NativeEventsReceiver for RecordingEventsReceiver {
    fn register_component_did_appear_listener(
        &self,
        callback: EventCallback<ComponentDidAppearEvent>,
    ) -> EmitterSubscription {
        self.subscribe("componentDidAppear", Listener::DidAppear(callback))
    }

    fn register_component_did_disappear_listener(
        &self,
        callback: EventCallback<ComponentDidDisappearEvent>,
    ) -> EmitterSubscription {
        self.subscribe("componentDidDisappear", Listener::DidDisappear(callback))
    }

    fn register_navigation_button_pressed_listener(
        &self,
        callback: EventCallback<NavigationButtonPressedEvent>,
    ) -> EmitterSubscription {
        self.subscribe("navigationButtonPressed", Listener::ButtonPressed(callback))
    }

    fn register_modal_dismissed_listener(
        &self,
        callback: EventCallback<ModalDismissedEvent>,
    ) -> EmitterSubscription {
        self.subscribe("modalDismissed", Listener::ModalDismissed(callback))
    }

    fn register_search_bar_updated_listener(
        &self,
        callback: EventCallback<SearchBarUpdatedEvent>,
    ) -> EmitterSubscription {
        self.subscribe("searchBarUpdated", Listener::SearchUpdated(callback))
    }

    fn register_search_bar_cancel_pressed_listener(
        &self,
        callback: EventCallback<SearchBarCancelPressedEvent>,
    ) -> EmitterSubscription {
        self.subscribe("searchBarCancelPressed", Listener::SearchCancel(callback))
    }

    fn register_app_launched_listener(&self, callback: AppLaunchedCallback) -> EmitterSubscription {
        self.subscribe("appLaunched", Listener::AppLaunched(callback))
    }

    fn register_command_completed_listener(
        &self,
        callback: EventCallback<CommandCompletedEvent>,
    ) -> EmitterSubscription {
        self.subscribe("commandCompleted", Listener::CommandCompleted(callback))
    }
}
