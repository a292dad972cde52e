//! Structural filename grammar: `ID-INDEX_CHANNEL-USER_TIMESTAMP.EXT`.
//!
//! The id/index and channel/user separators accept `-` or `_`; canonical
//! names always use `-` there.
use regex::Regex;
use std::sync::OnceLock;

const FILENAME_PATTERN: &str = concat!(
    r"^(?P<id>[0-9]+)[-_](?P<index>[0-9]+)_",
    r"(?P<channel>[0-9]+)[-_](?P<user>[0-9]+)_",
    r"(?P<timestamp>[^.]+)\.",
    r"(?P<extension>.+)$",
);

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FILENAME_PATTERN).expect("filename pattern compiles"))
}

/// Fields decomposed from a conforming filename, kept as the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub id: String,
    pub index: String,
    pub channel_id: String,
    pub user_id: String,
    pub timestamp: String,
    pub extension: String,
}

impl ParsedFilename {
    /// Decompose `name`, or `None` when it does not fit the grammar.
    pub fn parse(name: &str) -> Option<Self> {
        let caps = filename_regex().captures(name)?;
        Some(Self {
            id: caps["id"].to_string(),
            index: caps["index"].to_string(),
            channel_id: caps["channel"].to_string(),
            user_id: caps["user"].to_string(),
            timestamp: caps["timestamp"].to_string(),
            extension: caps["extension"].to_string(),
        })
    }

    /// Numeric id; `None` when the digit run overflows `u64`.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }

    /// Rebuild the canonical name with the given channel and user ids.
    pub fn canonical_name(&self, channel_id: &str, user_id: &str) -> String {
        format!(
            "{}-{}_{}-{}_{}.{}",
            self.id, self.index, channel_id, user_id, self.timestamp, self.extension
        )
    }

    /// Canonical name for new channel and user ids, or `None` unless that
    /// name parses back to this id, index, timestamp and extension with
    /// exactly the new ids.
    pub fn retarget(&self, channel_id: &str, user_id: &str) -> Option<String> {
        let name = self.canonical_name(channel_id, user_id);
        let reparsed = Self::parse(&name)?;
        let intact = reparsed.id == self.id
            && reparsed.index == self.index
            && reparsed.channel_id == channel_id
            && reparsed.user_id == user_id
            && reparsed.timestamp == self.timestamp
            && reparsed.extension == self.extension;
        intact.then_some(name)
    }
}
