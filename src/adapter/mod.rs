//! Production [`ScriptBridge`](crate::bridge::ScriptBridge) implementations.

pub mod chromiumoxide;
