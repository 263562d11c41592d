//! Native event intake: component lifecycle/interaction routing plus the
//! application-level listener facade.

mod app;
mod component;
mod native;
mod registry;
mod types;

pub use app::EventsRegistry;
pub use component::{COMPONENT_ID_PROP, NavigationComponent, Props, component_id_of};
pub use native::{EmitterSubscription, NativeEventsReceiver};
pub use registry::{ComponentEventsRegistry, EVENTS_TARGET, Subscription};
pub use types::{
    AppLaunchedCallback, Capabilities, CommandCompletedEvent, ComponentDidAppearEvent,
    ComponentDidDisappearEvent, Delivery, EventCallback, ModalDismissedEvent, NavigationButtonPressedEvent,
    SearchBarCancelPressedEvent, SearchBarUpdatedEvent,
};
