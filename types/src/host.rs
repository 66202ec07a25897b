use crate::debug::DebugAdapterRegistration;
use crate::language::LanguageConfiguration;
use crate::status::StatusItem;

/// The editor hosting kide.
///
/// Only the capabilities activation needs are modelled here; everything else
/// the editor does is outside this crate's concern.
pub trait Host: Send + Sync {
    /// Create a hidden status bar element.
    fn create_status_item(&self) -> Box<dyn StatusItem>;

    /// Install editing rules (indentation, word boundaries, on-enter
    /// behaviour) for `language_id`.
    fn set_language_configuration(&self, language_id: &str, config: LanguageConfiguration);

    /// Make a debug adapter available for its debug type.
    fn register_debug_adapter(&self, registration: DebugAdapterRegistration);
}
