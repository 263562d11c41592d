use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;
use serde_json::Value;

use crate::layout::{LayoutNode, RootLayout};

/// Layout attached to an observed command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandLayout {
    Root(RootLayout),
    Node(LayoutNode),
}

/// What observers see for every issued command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandPayload {
    pub command_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<CommandLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl CommandPayload {
    pub fn new(command_id: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            component_id: None,
            layout: None,
            options: None,
        }
    }

    pub fn with_component_id(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = Some(component_id.into());
        self
    }

    pub fn with_layout(mut self, layout: CommandLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

type CommandListener = Arc<dyn Fn(&str, &CommandPayload) + Send + Sync>;

#[derive(Default)]
struct ObserverState {
    next_token: AtomicU64,
    listeners: Mutex<BTreeMap<u64, CommandListener>>,
}

impl ObserverState {
    // Listeners run outside this lock, so a poisoned map is still consistent.
    fn listeners(&self) -> MutexGuard<'_, BTreeMap<u64, CommandListener>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Global fan-out of issued commands to cross-cutting listeners.
#[derive(Clone, Default)]
pub struct CommandsObserver {
    state: Arc<ObserverState>,
}

impl CommandsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, listener: F) -> CommandListenerHandle
    where
        F: Fn(&str, &CommandPayload) + Send + Sync + 'static,
    {
        let token = self.state.next_token.fetch_add(1, Ordering::Relaxed);
        self.state.listeners().insert(token, Arc::new(listener));
        CommandListenerHandle {
            token,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Call every listener registered before this call, in registration order.
    pub fn notify(&self, command_name: &str, payload: &CommandPayload) {
        let snapshot: Vec<CommandListener> = self.state.listeners().values().cloned().collect();
        for listener in snapshot {
            listener(command_name, payload);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.listeners().len()
    }
}

/// Unregister handle returned by [`CommandsObserver::register`].
#[derive(Debug, Clone)]
pub struct CommandListenerHandle {
    token: u64,
    state: Weak<ObserverState>,
}

impl CommandListenerHandle {
    /// Idempotent.
    pub fn remove(&self) {
        if let Some(state) = self.state.upgrade() {
            state.listeners().remove(&self.token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, CommandsObserver) {
        (Arc::new(Mutex::new(Vec::new())), CommandsObserver::new())
    }

    #[test]
    fn notifies_in_registration_order() {
        let (log, observer) = recorder();
        for tag in ["first", "second"] {
            let log = log.clone();
            observer.register(move |name, payload| {
                log.lock()
                    .unwrap()
                    .push(format!("{tag}:{name}:{}", payload.command_id));
            });
        }

        observer.notify("push", &CommandPayload::new("push1"));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:push:push1".to_string(), "second:push:push1".to_string()]
        );
    }

    #[test]
    fn removed_listener_is_silent_and_remove_is_idempotent() {
        let (log, observer) = recorder();
        let sink = log.clone();
        let handle = observer.register(move |name, _| sink.lock().unwrap().push(name.to_string()));

        handle.remove();
        handle.remove();
        observer.notify("pop", &CommandPayload::new("pop1"));

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(observer.listener_count(), 0);
    }

    #[test]
    fn listener_registered_during_notify_waits_for_next_pass() {
        let (log, observer) = recorder();
        let inner_observer = observer.clone();
        let sink = log.clone();
        observer.register(move |_, _| {
            let sink = sink.clone();
            inner_observer.register(move |name, _| sink.lock().unwrap().push(name.to_string()));
        });

        observer.notify("showModal", &CommandPayload::new("showModal1"));
        assert!(log.lock().unwrap().is_empty());

        observer.notify("dismissModal", &CommandPayload::new("dismissModal2"));
        assert_eq!(*log.lock().unwrap(), vec!["dismissModal".to_string()]);
    }

    #[test]
    fn poisoned_lock_still_registers_and_notifies() {
        let (log, observer) = recorder();
        let state = observer.state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = state.listeners.lock().unwrap();
            panic!("poison the listener map");
        })
        .join();
        assert!(observer.state.listeners.is_poisoned());

        let sink = log.clone();
        let handle = observer.register(move |name, _| sink.lock().unwrap().push(name.to_string()));
        observer.notify("popTo", &CommandPayload::new("popTo1"));
        assert_eq!(*log.lock().unwrap(), vec!["popTo".to_string()]);
        assert_eq!(observer.listener_count(), 1);

        handle.remove();
        assert_eq!(observer.listener_count(), 0);
    }

    #[test]
    fn payload_serializes_only_present_fields() {
        let payload = CommandPayload::new("popTo3").with_component_id("screen");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"commandId": "popTo3", "componentId": "screen"})
        );
    }
}
