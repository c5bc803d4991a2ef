//! Terminal colors
//!
//! Configs name one of nine abstract colors. Hosts only expose the eight
//! ANSI colors, so the mapping below is lossy by necessity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Abstract color a config may assign to a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Orange,
    Purple,
}

/// Color palette exposed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl TerminalColor {
    /// All abstract colors in declaration order
    pub fn all() -> &'static [TerminalColor] {
        &[
            TerminalColor::Red,
            TerminalColor::Green,
            TerminalColor::Yellow,
            TerminalColor::Blue,
            TerminalColor::Magenta,
            TerminalColor::Cyan,
            TerminalColor::White,
            TerminalColor::Orange,
            TerminalColor::Purple,
        ]
    }

    /// Config spelling of this color
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalColor::Red => "red",
            TerminalColor::Green => "green",
            TerminalColor::Yellow => "yellow",
            TerminalColor::Blue => "blue",
            TerminalColor::Magenta => "magenta",
            TerminalColor::Cyan => "cyan",
            TerminalColor::White => "white",
            TerminalColor::Orange => "orange",
            TerminalColor::Purple => "purple",
        }
    }

    /// Map to the host palette.
    ///
    /// | abstract | host    |
    /// |----------|---------|
    /// | red      | red     |
    /// | green    | green   |
    /// | yellow   | yellow  |
    /// | blue     | blue    |
    /// | magenta  | magenta |
    /// | cyan     | cyan    |
    /// | white    | white   |
    /// | orange   | yellow  |
    /// | purple   | magenta |
    pub fn to_host(self) -> HostColor {
        match self {
            TerminalColor::Red => HostColor::Red,
            TerminalColor::Green => HostColor::Green,
            TerminalColor::Yellow | TerminalColor::Orange => HostColor::Yellow,
            TerminalColor::Blue => HostColor::Blue,
            TerminalColor::Magenta | TerminalColor::Purple => HostColor::Magenta,
            TerminalColor::Cyan => HostColor::Cyan,
            TerminalColor::White => HostColor::White,
        }
    }
}

impl fmt::Display for TerminalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerminalColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TerminalColor::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown color '{}'", s))
    }
}

impl HostColor {
    /// ANSI color name as understood by tmux style strings
    pub fn ansi_name(&self) -> &'static str {
        match self {
            HostColor::Red => "red",
            HostColor::Green => "green",
            HostColor::Yellow => "yellow",
            HostColor::Blue => "blue",
            HostColor::Magenta => "magenta",
            HostColor::Cyan => "cyan",
            HostColor::White => "white",
        }
    }
}
