use serde_json::Value;
use thiserror::Error;

use crate::layout::{LayoutNode, RootLayout};

pub type NativeResult<T> = std::result::Result<T, NativeSenderError>;

/// Failure reported by the native presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("native `{command}` failed: {message}")]
pub struct NativeSenderError {
    pub command: String,
    pub message: String,
}

impl NativeSenderError {
    pub fn new(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Command sink implemented by the native presentation layer.
///
/// Every method receives the correlation id minted for the call. The returned
/// value is handed back to the caller of the matching [`Commands`](super::Commands)
/// operation untouched.
pub trait NativeCommandsSender: Send + Sync {
    fn set_root(&self, command_id: &str, layout: &RootLayout) -> NativeResult<Value>;

    fn set_default_options(&self, command_id: &str, options: &Value) -> NativeResult<()>;

    fn merge_options(&self, command_id: &str, component_id: &str, options: &Value)
    -> NativeResult<()>;

    fn show_modal(&self, command_id: &str, layout: &LayoutNode) -> NativeResult<Value>;

    fn dismiss_modal(&self, command_id: &str, component_id: &str) -> NativeResult<Value>;

    fn dismiss_all_modals(&self, command_id: &str) -> NativeResult<Value>;

    fn push(&self, command_id: &str, component_id: &str, layout: &LayoutNode)
    -> NativeResult<Value>;

    fn pop(&self, command_id: &str, component_id: &str, options: Option<&Value>)
    -> NativeResult<Value>;

    fn pop_to(&self, command_id: &str, component_id: &str) -> NativeResult<Value>;

    fn pop_to_root(&self, command_id: &str, component_id: &str) -> NativeResult<Value>;

    fn set_stack_root(
        &self,
        command_id: &str,
        component_id: &str,
        layout: &LayoutNode,
    ) -> NativeResult<Value>;

    fn show_overlay(&self, command_id: &str, layout: &LayoutNode) -> NativeResult<Value>;

    fn dismiss_overlay(&self, command_id: &str, component_id: &str) -> NativeResult<Value>;

    fn get_launch_args(&self, command_id: &str) -> NativeResult<Value>;
}
