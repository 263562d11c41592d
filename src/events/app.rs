use std::sync::Arc;

use crate::commands::{CommandListenerHandle, CommandPayload, CommandsObserver};
use crate::error::Result;

use super::component::NavigationComponent;
use super::native::{EmitterSubscription, NativeEventsReceiver};
use super::registry::{ComponentEventsRegistry, Subscription};
use super::types::CommandCompletedEvent;

/// Application-facing entry point for every kind of navigation event.
#[derive(Clone)]
pub struct EventsRegistry {
    receiver: Arc<dyn NativeEventsReceiver>,
    observer: CommandsObserver,
    components: ComponentEventsRegistry,
}

impl EventsRegistry {
    pub fn new(
        receiver: Arc<dyn NativeEventsReceiver>,
        observer: CommandsObserver,
        components: ComponentEventsRegistry,
    ) -> Self {
        Self {
            receiver,
            observer,
            components,
        }
    }

    pub fn register_app_launched_listener<F>(&self, callback: F) -> EmitterSubscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.receiver.register_app_launched_listener(Arc::new(callback))
    }

    pub fn register_command_completed_listener<F>(&self, callback: F) -> EmitterSubscription
    where
        F: Fn(&CommandCompletedEvent) + Send + Sync + 'static,
    {
        self.receiver
            .register_command_completed_listener(Arc::new(callback))
    }

    /// Observe every command as it is issued, before the native side has completed it.
    pub fn register_command_listener<F>(&self, callback: F) -> CommandListenerHandle
    where
        F: Fn(&str, &CommandPayload) + Send + Sync + 'static,
    {
        self.observer.register(callback)
    }

    pub fn bind_component<C>(&self, instance: &Arc<C>) -> Result<Subscription>
    where
        C: NavigationComponent + 'static,
    {
        self.components.bind_component(instance)
    }

    pub fn components(&self) -> &ComponentEventsRegistry {
        &self.components
    }
}
