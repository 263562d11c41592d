//! Navigation bridge between application code and a native navigation host.
//!
//! Commands flow out through [`Commands`]: layouts are parsed and crawled,
//! each request gets a correlation id, the native sender is invoked, and every
//! [`CommandsObserver`] listener hears about it. Events flow in through
//! [`EventsRegistry`], which routes component lifecycle and interaction events
//! to bound [`NavigationComponent`] instances by `componentId`.

pub mod commands;
pub mod error;
pub mod events;
pub mod ids;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod navigation;
pub mod testing;

pub use commands::{
    CommandLayout, CommandListenerHandle, CommandLoggerListener, CommandPayload, Commands,
    CommandsObserver, NativeCommandsSender, NativeResult, NativeSenderError,
};
pub use error::{NavigationError, Result};
pub use events::{
    Capabilities, CommandCompletedEvent, ComponentDidAppearEvent, ComponentDidDisappearEvent,
    ComponentEventsRegistry, Delivery, EmitterSubscription, EventsRegistry, ModalDismissedEvent,
    NativeEventsReceiver, NavigationButtonPressedEvent, NavigationComponent, Props,
    SearchBarCancelPressedEvent, SearchBarUpdatedEvent, Subscription,
};
pub use ids::UniqueIdProvider;
pub use layout::{LayoutNode, LayoutTransform, LayoutTreeTransform, LayoutType, RootLayout};
pub use logging::{LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult};
pub use metrics::{MetricSnapshot, NavigationMetrics};
pub use navigation::{Navigation, NavigationConfig};
