//! Status surface seam for chord-in-progress feedback

/// Identifier of the status element chord feedback is published under
pub const KEYBINDING_STATUS_ID: &str = "keybinding-status";

/// Host status bar (or equivalent) the runtime reports pending chords to
pub trait ChordStatus {
    fn show(&mut self, id: &str, text: &str);
    fn clear(&mut self, id: &str);
}

/// Discards all status updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStatus;

impl ChordStatus for NoStatus {
    fn show(&mut self, _id: &str, _text: &str) {}
    fn clear(&mut self, _id: &str) {}
}

/// Keeps the latest text per status id in memory
#[derive(Debug, Default, Clone)]
pub struct StatusText {
    entries: Vec<(String, String)>,
}

impl StatusText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently shown under `id`
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == id)
            .map(|(_, text)| text.as_str())
    }
}

impl ChordStatus for StatusText {
    fn show(&mut self, id: &str, text: &str) {
        match self.entries.iter_mut().find(|(entry, _)| entry == id) {
            Some((_, current)) => *current = text.to_string(),
            None => self.entries.push((id.to_string(), text.to_string())),
        }
    }

    fn clear(&mut self, id: &str) {
        self.entries.retain(|(entry, _)| entry != id);
    }
}

/// Message shown while the runtime waits for the rest of a chord
pub fn pending_chord_text(accelerators: &[String]) -> String {
    format!("({}) was pressed, waiting for more keys", accelerators.join(" "))
}
