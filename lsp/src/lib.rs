//! Kotlin language server activator.
//!
//! Finds the server executable, spawns it, performs the LSP `initialize`
//! handshake and hands the running client to the host through the extension
//! context. Document sync and diagnostics are not implemented here.

pub mod codec;

pub(crate) mod protocol;

mod activator;
mod client;

pub use activator::{LANGUAGE_SERVER, activate_language_server};
pub use client::LanguageClient;
