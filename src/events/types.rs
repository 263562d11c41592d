use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDidAppearEvent {
    pub component_id: String,
    pub component_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDidDisappearEvent {
    pub component_id: String,
    pub component_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationButtonPressedEvent {
    pub component_id: String,
    pub button_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalDismissedEvent {
    pub component_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBarUpdatedEvent {
    pub component_id: String,
    pub text: String,
    pub is_focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBarCancelPressedEvent {
    pub component_id: String,
}

/// Emitted by the native layer once a command has been fully applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCompletedEvent {
    pub command_id: String,
    /// Milliseconds since the epoch, as reported by the native side.
    pub completion_time: u64,
}

/// What a [`NavigationComponent`](super::NavigationComponent) handler reports
/// back to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Handled,
    /// No handler for this kind. The default handler bodies return this.
    Unhandled,
}

bitflags! {
    /// A set of component event kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const COMPONENT_DID_APPEAR = 1 << 0;
        const COMPONENT_DID_DISAPPEAR = 1 << 1;
        const NAVIGATION_BUTTON_PRESSED = 1 << 2;
        const MODAL_DISMISSED = 1 << 3;
        const SEARCH_BAR_UPDATED = 1 << 4;
        const SEARCH_BAR_CANCEL_PRESSED = 1 << 5;
    }
}

pub type EventCallback<E> = Arc<dyn Fn(&E) + Send + Sync>;

pub type AppLaunchedCallback = Arc<dyn Fn() + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_use_camel_case_on_the_wire() {
        let event: SearchBarUpdatedEvent = serde_json::from_value(json!({
            "componentId": "myCompId",
            "text": "theText",
            "isFocused": true
        }))
        .unwrap();
        assert_eq!(event.component_id, "myCompId");
        assert!(event.is_focused);

        let button = NavigationButtonPressedEvent {
            component_id: "myCompId".into(),
            button_id: "myButtonId".into(),
        };
        assert_eq!(
            serde_json::to_value(&button).unwrap(),
            json!({"componentId": "myCompId", "buttonId": "myButtonId"})
        );
    }

    #[test]
    fn capabilities_compose() {
        let caps = Capabilities::COMPONENT_DID_APPEAR | Capabilities::MODAL_DISMISSED;
        assert!(caps.contains(Capabilities::MODAL_DISMISSED));
        assert!(!caps.contains(Capabilities::SEARCH_BAR_UPDATED));
        assert_eq!(Capabilities::all().iter().count(), 6);
    }
}
