use serde::{Deserialize, Serialize};
use std::fmt;

/// Global shortcut preference stored in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Hotkey {
    #[default]
    CmdShiftV,
    CmdCtrlShiftV,
    CmdAltV,
    CmdShiftN,
}

impl Hotkey {
    pub const ALL: [Hotkey; 4] = [
        Hotkey::CmdShiftV,
        Hotkey::CmdCtrlShiftV,
        Hotkey::CmdAltV,
        Hotkey::CmdShiftN,
    ];

    /// Symbolic form shown in menus and written to the config file.
    pub fn display(self) -> &'static str {
        match self {
            Hotkey::CmdShiftV => "⌘⇧V",
            Hotkey::CmdCtrlShiftV => "⌘⌃⇧V",
            Hotkey::CmdAltV => "⌘⌥V",
            Hotkey::CmdShiftN => "⌘⇧N",
        }
    }

    /// Key chord in the `<mod>+<mod>+key` form used by hotkey listeners.
    pub fn chord(self) -> &'static str {
        match self {
            Hotkey::CmdShiftV => "<cmd>+<shift>+v",
            Hotkey::CmdCtrlShiftV => "<cmd>+<ctrl>+<shift>+v",
            Hotkey::CmdAltV => "<cmd>+<alt>+v",
            Hotkey::CmdShiftN => "<cmd>+<shift>+n",
        }
    }

    /// Parse a stored preference. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        Self::ALL
            .into_iter()
            .find(|h| h.display() == cleaned || h.chord().eq_ignore_ascii_case(cleaned))
    }
}

impl From<String> for Hotkey {
    fn from(value: String) -> Self {
        Hotkey::parse(&value).unwrap_or_else(|| {
            tracing::warn!(hotkey = %value, "unrecognised hotkey, using default");
            Hotkey::default()
        })
    }
}

impl From<Hotkey> for String {
    fn from(value: Hotkey) -> Self {
        value.display().to_string()
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}
