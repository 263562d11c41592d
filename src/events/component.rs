use serde_json::{Map, Value};

use crate::error::{NavigationError, Result};

use super::types::{
    ComponentDidAppearEvent, ComponentDidDisappearEvent, Delivery, ModalDismissedEvent,
    NavigationButtonPressedEvent, SearchBarCancelPressedEvent, SearchBarUpdatedEvent,
};

/// Props handed to a component by the native layer.
pub type Props = Map<String, Value>;

pub const COMPONENT_ID_PROP: &str = "componentId";

/// A mounted view that can be bound to the [`ComponentEventsRegistry`].
///
/// Override the handlers for the events the view cares about and return
/// [`Delivery::Handled`] from them. The default bodies return
/// [`Delivery::Unhandled`]; the registry takes that as "no handler" and stops
/// offering that kind of event to the binding.
///
/// [`ComponentEventsRegistry`]: super::ComponentEventsRegistry
pub trait NavigationComponent: Send + Sync {
    fn props(&self) -> &Props;

    fn component_did_appear(&self, _event: &ComponentDidAppearEvent) -> Delivery {
        Delivery::Unhandled
    }

    fn component_did_disappear(&self, _event: &ComponentDidDisappearEvent) -> Delivery {
        Delivery::Unhandled
    }

    fn navigation_button_pressed(&self, _event: &NavigationButtonPressedEvent) -> Delivery {
        Delivery::Unhandled
    }

    fn modal_dismissed(&self, _event: &ModalDismissedEvent) -> Delivery {
        Delivery::Unhandled
    }

    fn search_bar_updated(&self, _event: &SearchBarUpdatedEvent) -> Delivery {
        Delivery::Unhandled
    }

    fn search_bar_cancel_pressed(&self, _event: &SearchBarCancelPressedEvent) -> Delivery {
        Delivery::Unhandled
    }
}

/// Read the routable id out of a props bag.
pub fn component_id_of(props: &Props) -> Result<String> {
    match props.get(COMPONENT_ID_PROP) {
        None | Some(Value::Null) => Err(NavigationError::invalid_component(
            "component has no componentId prop",
        )),
        Some(Value::String(id)) => Ok(id.clone()),
        Some(other) => Err(NavigationError::invalid_component(format!(
            "componentId must be a string, got {other}"
        ))),
    }
}
