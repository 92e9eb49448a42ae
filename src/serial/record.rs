use std::fmt;

/// One line read from the serial device, without its `\n`
///
/// The text is relayed verbatim; nothing is parsed server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    raw: String,
}

impl Record {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw line text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Record {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
