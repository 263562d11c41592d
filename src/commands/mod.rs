//! Command issuance: the dispatcher, the native sender contract, and the
//! observer fan-out that reports every issued command.

mod core;
pub mod diagnostics;
mod native;
mod observer;

pub use self::core::{COMMANDS_TARGET, Commands};
pub use diagnostics::{COMMAND_OBSERVER_TARGET, CommandLoggerListener};
pub use native::{NativeCommandsSender, NativeResult, NativeSenderError};
pub use observer::{CommandLayout, CommandListenerHandle, CommandPayload, CommandsObserver};
