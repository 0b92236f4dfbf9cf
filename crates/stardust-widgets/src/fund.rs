#![forbid(unsafe_code)]

//! Fund data shown on a card.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Category of a fund.
///
/// Parsing is an exact, case-sensitive match on the variant name; anything
/// else is kept verbatim in [`FundKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FundKind {
    Project,
    Mentorship,
    Research,
    Community,
    Other(String),
}

impl FundKind {
    /// Glyph shown next to project funds.
    pub const PROJECT_GLYPH: char = '\u{1F680}';
    /// Glyph shown next to every other kind.
    pub const DEFAULT_GLYPH: char = '\u{1FAC0}';

    /// Parse a category name. Never fails.
    pub fn parse(name: &str) -> Self {
        match name {
            "Project" => Self::Project,
            "Mentorship" => Self::Mentorship,
            "Research" => Self::Research,
            "Community" => Self::Community,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Display name.
    pub fn label(&self) -> &str {
        match self {
            Self::Project => "Project",
            Self::Mentorship => "Mentorship",
            Self::Research => "Research",
            Self::Community => "Community",
            Self::Other(name) => name,
        }
    }

    /// Glyph for the category line.
    pub const fn glyph(&self) -> char {
        match self {
            Self::Project => Self::PROJECT_GLYPH,
            Self::Mentorship | Self::Research | Self::Community | Self::Other(_) => {
                Self::DEFAULT_GLYPH
            }
        }
    }
}

impl FromStr for FundKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FundKind {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl fmt::Display for FundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text shown when a fund has no description.
pub const NO_DESCRIPTION: &str = "No description provided";

/// Everything a card displays about one fund.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundDescriptor {
    pub kind: FundKind,
    pub title: String,
    pub description: String,
}

impl FundDescriptor {
    pub fn new(
        kind: impl Into<FundKind>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// `"{label} {glyph}"`.
    pub fn category_line(&self) -> String {
        format!("{} {}", self.kind.label(), self.kind.glyph())
    }

    /// The description, or [`NO_DESCRIPTION`] if it is blank.
    pub fn description_text(&self) -> &str {
        if self.description.trim().is_empty() {
            NO_DESCRIPTION
        } else {
            &self.description
        }
    }
}
