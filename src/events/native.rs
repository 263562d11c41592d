use std::sync::Mutex;

use super::types::{
    AppLaunchedCallback, CommandCompletedEvent, ComponentDidAppearEvent,
    ComponentDidDisappearEvent, EventCallback, ModalDismissedEvent, NavigationButtonPressedEvent,
    SearchBarCancelPressedEvent, SearchBarUpdatedEvent,
};

type RemoveFn = Box<dyn FnOnce() + Send>;

/// Unregister handle handed out by a [`NativeEventsReceiver`].
pub struct EmitterSubscription {
    remove: Mutex<Option<RemoveFn>>,
}

impl EmitterSubscription {
    pub fn new<F>(remove: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            remove: Mutex::new(Some(Box::new(remove))),
        }
    }

    /// Runs the unregister callback the first time; later calls do nothing.
    pub fn remove(&self) {
        let remove = match self.remove.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(remove) = remove {
            remove();
        }
    }
}

impl std::fmt::Debug for EmitterSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self
            .remove
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false);
        f.debug_struct("EmitterSubscription")
            .field("active", &active)
            .finish()
    }
}

/// Event source implemented by the native presentation layer.
pub trait NativeEventsReceiver: Send + Sync {
    fn register_component_did_appear_listener(
        &self,
        callback: EventCallback<ComponentDidAppearEvent>,
    ) -> EmitterSubscription;

    fn register_component_did_disappear_listener(
        &self,
        callback: EventCallback<ComponentDidDisappearEvent>,
    ) -> EmitterSubscription;

    fn register_navigation_button_pressed_listener(
        &self,
        callback: EventCallback<NavigationButtonPressedEvent>,
    ) -> EmitterSubscription;

    fn register_modal_dismissed_listener(
        &self,
        callback: EventCallback<ModalDismissedEvent>,
    ) -> EmitterSubscription;

    fn register_search_bar_updated_listener(
        &self,
        callback: EventCallback<SearchBarUpdatedEvent>,
    ) -> EmitterSubscription;

    fn register_search_bar_cancel_pressed_listener(
        &self,
        callback: EventCallback<SearchBarCancelPressedEvent>,
    ) -> EmitterSubscription;

    fn register_app_launched_listener(&self, callback: AppLaunchedCallback) -> EmitterSubscription;

    fn register_command_completed_listener(
        &self,
        callback: EventCallback<CommandCompletedEvent>,
    ) -> EmitterSubscription;
}
