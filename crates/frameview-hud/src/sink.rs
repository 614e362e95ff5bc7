/// Initial content of HUD text fields, kept until a real value is written.
pub const PLACEHOLDER: &str = "—";

/// External text output written by the sampler and the probe.
///
/// Writers borrow a sink per call and never own it; the sink's owner decides
/// how (and whether) the text becomes visible.
pub trait TextSink {
    /// Replaces the sink's content.
    fn set_text(&mut self, text: &str);
}

/// A HUD-owned text field.
///
/// Starts at [`PLACEHOLDER`] and keeps the most recently written text.
#[derive(Debug, Clone)]
pub struct TextField {
    text: String,
}

impl TextField {
    pub fn new() -> Self {
        Self {
            text: PLACEHOLDER.to_string(),
        }
    }

    /// Current content.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSink for TextField {
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }
}

/// Sink recording every write, for assertions on write counts and order.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub writes: Vec<String>,
}

#[cfg(test)]
impl TextSink for RecordingSink {
    fn set_text(&mut self, text: &str) {
        self.writes.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_starts_at_placeholder() {
        assert_eq!(TextField::new().text(), PLACEHOLDER);
    }

    #[test]
    fn field_keeps_last_write() {
        let mut field = TextField::new();
        field.set_text("59.9");
        field.set_text("60.1");
        assert_eq!(field.text(), "60.1");
    }
}
