use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde_json::json;

use crate::error::Result;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::NavigationMetrics;

use super::component::{NavigationComponent, component_id_of};
use super::native::{EmitterSubscription, NativeEventsReceiver};
use super::types::{
    Capabilities, ComponentDidAppearEvent, ComponentDidDisappearEvent, Delivery, EventCallback,
    ModalDismissedEvent, NavigationButtonPressedEvent, SearchBarCancelPressedEvent,
    SearchBarUpdatedEvent,
};

pub const EVENTS_TARGET: &str = "navbridge::events";

struct ComponentRecord {
    // Kinds whose handler answered `Unhandled`; never offered again.
    missing: Capabilities,
    listener: Weak<dyn NavigationComponent>,
}

#[derive(Default)]
struct RegistryState {
    next_token: u64,
    // Tokens only grow, so each bucket iterates in binding order.
    records: HashMap<String, BTreeMap<u64, ComponentRecord>>,
}

struct RegistryInner {
    state: Mutex<RegistryState>,
    receiver: Arc<dyn NativeEventsReceiver>,
    registered: AtomicBool,
    native_subscriptions: Mutex<Vec<EmitterSubscription>>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<NavigationMetrics>>>,
}

/// Routes native component events to the views bound under a component id.
///
/// The registry keeps weak references only; dropping the last strong handle
/// of a bound view silently retires its record. Cloning yields another handle
/// to the same registry.
#[derive(Clone)]
pub struct ComponentEventsRegistry {
    inner: Arc<RegistryInner>,
}

impl ComponentEventsRegistry {
    pub fn new(receiver: Arc<dyn NativeEventsReceiver>) -> Self {
        Self::with_diagnostics(receiver, None, None)
    }

    pub fn with_diagnostics(
        receiver: Arc<dyn NativeEventsReceiver>,
        logger: Option<Logger>,
        metrics: Option<Arc<Mutex<NavigationMetrics>>>,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                state: Mutex::new(RegistryState::default()),
                receiver,
                registered: AtomicBool::new(false),
                native_subscriptions: Mutex::new(Vec::new()),
                logger,
                metrics,
            }),
        }
    }

    /// Bind `instance` under the `componentId` found in its props.
    pub fn bind_component<C>(&self, instance: &Arc<C>) -> Result<Subscription>
    where
        C: NavigationComponent + 'static,
    {
        let component_id = component_id_of(instance.props())?;
        let listener: Arc<dyn NavigationComponent> = instance.clone();
        let record = ComponentRecord {
            missing: Capabilities::empty(),
            listener: Arc::downgrade(&listener),
        };

        let token = {
            let mut state = self.lock_state();
            let token = state.next_token;
            state.next_token += 1;
            state
                .records
                .entry(component_id.clone())
                .or_default()
                .insert(token, record);
            token
        };

        self.with_metrics(|metrics| metrics.record_binding());
        self.log(
            LogLevel::Debug,
            "component_bound",
            [
                json_kv("component_id", json!(component_id)),
                json_kv("token", json!(token)),
            ],
        );

        Ok(Subscription {
            component_id,
            token,
            registry: Arc::downgrade(&self.inner),
        })
    }

    /// Drop every record bound under `component_id`. Returns how many were removed.
    pub fn unmounted(&self, component_id: &str) -> usize {
        let removed = self
            .lock_state()
            .records
            .remove(component_id)
            .map(|bucket| bucket.len())
            .unwrap_or(0);
        if removed > 0 {
            self.log(
                LogLevel::Debug,
                "component_unmounted",
                [
                    json_kv("component_id", json!(component_id)),
                    json_kv("removed", json!(removed)),
                ],
            );
        }
        removed
    }

    pub fn bound_count(&self, component_id: &str) -> usize {
        self.lock_state()
            .records
            .get(component_id)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    pub fn is_registered(&self) -> bool {
        self.inner.registered.load(Ordering::SeqCst)
    }

    /// Subscribe to every component event of the native receiver. Only the
    /// first call on a registry does anything.
    pub fn register_once_for_all_component_events(&self) {
        if self.inner.registered.swap(true, Ordering::SeqCst) {
            return;
        }

        let receiver = &self.inner.receiver;
        let subscriptions = vec![
            receiver
                .register_component_did_appear_listener(self.forward(Self::notify_component_did_appear)),
            receiver.register_component_did_disappear_listener(
                self.forward(Self::notify_component_did_disappear),
            ),
            receiver.register_navigation_button_pressed_listener(
                self.forward(Self::notify_navigation_button_pressed),
            ),
            receiver.register_modal_dismissed_listener(self.forward(Self::notify_modal_dismissed)),
            receiver
                .register_search_bar_updated_listener(self.forward(Self::notify_search_bar_updated)),
            receiver.register_search_bar_cancel_pressed_listener(
                self.forward(Self::notify_search_bar_cancel_pressed),
            ),
        ];

        if let Ok(mut guard) = self.inner.native_subscriptions.lock() {
            guard.extend(subscriptions);
        }
        self.log(
            LogLevel::Info,
            "registered_for_component_events",
            std::iter::empty(),
        );
    }

    pub fn notify_component_did_appear(&self, event: &ComponentDidAppearEvent) -> usize {
        self.deliver(
            &event.component_id,
            Capabilities::COMPONENT_DID_APPEAR,
            "componentDidAppear",
            |component| component.component_did_appear(event),
        )
    }

    pub fn notify_component_did_disappear(&self, event: &ComponentDidDisappearEvent) -> usize {
        self.deliver(
            &event.component_id,
            Capabilities::COMPONENT_DID_DISAPPEAR,
            "componentDidDisappear",
            |component| component.component_did_disappear(event),
        )
    }

    pub fn notify_navigation_button_pressed(&self, event: &NavigationButtonPressedEvent) -> usize {
        self.deliver(
            &event.component_id,
            Capabilities::NAVIGATION_BUTTON_PRESSED,
            "navigationButtonPressed",
            |component| component.navigation_button_pressed(event),
        )
    }

    pub fn notify_modal_dismissed(&self, event: &ModalDismissedEvent) -> usize {
        self.deliver(
            &event.component_id,
            Capabilities::MODAL_DISMISSED,
            "modalDismissed",
            |component| component.modal_dismissed(event),
        )
    }

    pub fn notify_search_bar_updated(&self, event: &SearchBarUpdatedEvent) -> usize {
        self.deliver(
            &event.component_id,
            Capabilities::SEARCH_BAR_UPDATED,
            "searchBarUpdated",
            |component| component.search_bar_updated(event),
        )
    }

    pub fn notify_search_bar_cancel_pressed(&self, event: &SearchBarCancelPressedEvent) -> usize {
        self.deliver(
            &event.component_id,
            Capabilities::SEARCH_BAR_CANCEL_PRESSED,
            "searchBarCancelPressed",
            |component| component.search_bar_cancel_pressed(event),
        )
    }

    fn forward<E: 'static>(&self, notify: fn(&Self, &E) -> usize) -> EventCallback<E> {
        let registry = Arc::downgrade(&self.inner);
        Arc::new(move |event: &E| {
            if let Some(inner) = registry.upgrade() {
                notify(&ComponentEventsRegistry { inner }, event);
            }
        })
    }

    fn deliver<F>(
        &self,
        component_id: &str,
        capability: Capabilities,
        event_name: &str,
        invoke: F,
    ) -> usize
    where
        F: Fn(&dyn NavigationComponent) -> Delivery,
    {
        let snapshot = self.snapshot(component_id, capability);

        let mut delivered = 0;
        for (token, listener) in snapshot {
            // An earlier listener in this pass may have removed this one.
            if !self.is_bound(component_id, token) {
                continue;
            }
            match invoke(listener.as_ref()) {
                Delivery::Handled => delivered += 1,
                Delivery::Unhandled => self.mark_missing(component_id, token, capability),
            }
        }

        self.with_metrics(|metrics| metrics.record_event(delivered));
        let level = if delivered == 0 {
            LogLevel::Trace
        } else {
            LogLevel::Debug
        };
        self.log(
            level,
            "event_delivered",
            [
                json_kv("event", json!(event_name)),
                json_kv("component_id", json!(component_id)),
                json_kv("listeners", json!(delivered)),
            ],
        );
        delivered
    }

    /// Live listeners for `component_id` not yet known to lack a handler for
    /// `capability`, in binding order. Records whose view is gone are pruned on
    /// the way.
    fn snapshot(
        &self,
        component_id: &str,
        capability: Capabilities,
    ) -> Vec<(u64, Arc<dyn NavigationComponent>)> {
        let mut state = self.lock_state();
        let Some(bucket) = state.records.get_mut(component_id) else {
            return Vec::new();
        };

        let mut live = Vec::new();
        bucket.retain(|token, record| match record.listener.upgrade() {
            Some(listener) => {
                if !record.missing.contains(capability) {
                    live.push((*token, listener));
                }
                true
            }
            None => false,
        });

        if bucket.is_empty() {
            state.records.remove(component_id);
        }
        live
    }

    fn mark_missing(&self, component_id: &str, token: u64, capability: Capabilities) {
        let mut state = self.lock_state();
        if let Some(record) = state
            .records
            .get_mut(component_id)
            .and_then(|bucket| bucket.get_mut(&token))
        {
            record.missing.insert(capability);
        }
    }

    fn is_bound(&self, component_id: &str, token: u64) -> bool {
        self.lock_state()
            .records
            .get(component_id)
            .is_some_and(|bucket| bucket.contains_key(&token))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        self.inner.lock_state()
    }

    fn with_metrics(&self, record: impl FnOnce(&mut NavigationMetrics)) {
        if let Some(metrics) = self.inner.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut guard);
            }
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.inner.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, EVENTS_TARGET, message, fields));
        }
    }
}

impl RegistryInner {
    // A panicking listener never runs under this lock, so poisoning only
    // reflects a panic inside the registry itself; the map is still usable.
    fn lock_state(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn remove(&self, component_id: &str, token: u64) -> bool {
        let mut state = self.lock_state();
        let Some(bucket) = state.records.get_mut(component_id) else {
            return false;
        };
        let removed = bucket.remove(&token).is_some();
        if bucket.is_empty() {
            state.records.remove(component_id);
        }
        removed
    }
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        let subscriptions = match self.native_subscriptions.get_mut() {
            Ok(subscriptions) => std::mem::take(subscriptions),
            Err(poisoned) => std::mem::take(poisoned.into_inner()),
        };
        for subscription in subscriptions {
            subscription.remove();
        }
    }
}

/// Handle for one binding made by [`ComponentEventsRegistry::bind_component`].
#[derive(Debug, Clone)]
pub struct Subscription {
    component_id: String,
    token: u64,
    registry: Weak<RegistryInner>,
}

impl Subscription {
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Stop delivering events to this binding. Safe to call repeatedly and
    /// after the id was cleared by [`ComponentEventsRegistry::unmounted`].
    pub fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.component_id, self.token);
        }
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
            && self.component_id == other.component_id
            && Weak::ptr_eq(&self.registry, &other.registry)
    }
}

impl Eq for Subscription {}
