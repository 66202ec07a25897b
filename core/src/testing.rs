//! Recording host and log capture shared by the coordinator tests.

use std::sync::{Arc, Mutex};

use kide_types::{DebugAdapterRegistration, Host, LanguageConfiguration, StatusItem};

/// Collects formatted `tracing` output for the current thread.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Install a subscriber writing into this buffer until the guard drops.
    pub fn capture(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(Mutex::new(self.clone()))
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Created(usize),
    Text(usize, String),
    Shown(usize),
    Disposed(usize),
    LanguageConfigured(String),
    DebugAdapterRegistered(String),
}

#[derive(Default)]
pub struct RecordingHost {
    events: Arc<Mutex<Vec<HostEvent>>>,
    next_id: Mutex<usize>,
}

impl RecordingHost {
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn created_count(&self) -> usize {
        self.count(|event| matches!(event, HostEvent::Created(_)))
    }

    pub fn dispose_count(&self, id: usize) -> usize {
        self.count(|event| *event == HostEvent::Disposed(id))
    }

    pub fn shown_count(&self, id: usize) -> usize {
        self.count(|event| *event == HostEvent::Shown(id))
    }

    fn count(&self, predicate: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }
}

struct RecordingItem {
    id: usize,
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl RecordingItem {
    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl StatusItem for RecordingItem {
    fn show(&mut self) {
        self.record(HostEvent::Shown(self.id));
    }

    fn set_text(&mut self, text: &str) {
        self.record(HostEvent::Text(self.id, text.to_string()));
    }

    fn dispose(&mut self) {
        self.record(HostEvent::Disposed(self.id));
    }
}

impl Host for RecordingHost {
    fn create_status_item(&self) -> Box<dyn StatusItem> {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        self.events.lock().unwrap().push(HostEvent::Created(id));
        Box::new(RecordingItem {
            id,
            events: Arc::clone(&self.events),
        })
    }

    fn set_language_configuration(&self, language_id: &str, _config: LanguageConfiguration) {
        self.events
            .lock()
            .unwrap()
            .push(HostEvent::LanguageConfigured(language_id.to_string()));
    }

    fn register_debug_adapter(&self, registration: DebugAdapterRegistration) {
        self.events
            .lock()
            .unwrap()
            .push(HostEvent::DebugAdapterRegistered(registration.debug_type));
    }
}
