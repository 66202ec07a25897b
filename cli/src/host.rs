//! Headless [`Host`] for running kide outside an editor.
//!
//! Status items become log lines; language rules and debug adapter
//! registrations are kept in memory and logged as JSON so a wrapping tool can
//! pick them up.

use std::sync::{Mutex, PoisonError};

use kide_types::{DebugAdapterRegistration, Host, LanguageConfiguration, StatusItem};

#[derive(Default)]
pub struct TerminalHost {
    languages: Mutex<Vec<(String, LanguageConfiguration)>>,
    debug_adapters: Mutex<Vec<DebugAdapterRegistration>>,
}

impl TerminalHost {
    pub fn configured_languages(&self) -> Vec<String> {
        self.languages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn debug_types(&self) -> Vec<String> {
        self.debug_adapters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|registration| registration.debug_type.clone())
            .collect()
    }
}

impl Host for TerminalHost {
    fn create_status_item(&self) -> Box<dyn StatusItem> {
        Box::new(LogStatusItem::default())
    }

    fn set_language_configuration(&self, language_id: &str, config: LanguageConfiguration) {
        match serde_json::to_string(&config) {
            Ok(json) => tracing::debug!(language_id, %json, "Language configuration set"),
            Err(e) => {
                tracing::warn!(language_id, "Failed to serialize language configuration: {e}");
            }
        }
        let mut languages = self.languages.lock().unwrap_or_else(PoisonError::into_inner);
        languages.retain(|(id, _)| id != language_id);
        languages.push((language_id.to_string(), config));
    }

    fn register_debug_adapter(&self, registration: DebugAdapterRegistration) {
        match serde_json::to_string(&registration) {
            Ok(json) => tracing::info!(
                debug_type = %registration.debug_type,
                %json,
                "Debug adapter registered"
            ),
            Err(e) => tracing::warn!("Failed to serialize debug adapter registration: {e}"),
        }
        self.debug_adapters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(registration);
    }
}

/// Status item that logs its text while visible.
#[derive(Default)]
struct LogStatusItem {
    visible: bool,
    text: String,
}

impl StatusItem for LogStatusItem {
    fn show(&mut self) {
        self.visible = true;
        if !self.text.is_empty() {
            tracing::info!(target: "kide::status", "{}", self.text);
        }
    }

    fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        if self.visible {
            tracing::info!(target: "kide::status", "{text}");
        }
    }

    fn dispose(&mut self) {
        self.visible = false;
    }
}
