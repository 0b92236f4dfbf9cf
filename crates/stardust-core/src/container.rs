#![forbid(unsafe_code)]

//! Container identity.

use std::fmt;

/// Opaque identifier of a rendered container owned by a layout host.
///
/// Identifiers are never reused by the headless host, so a stale id simply
/// refers to a container that is no longer mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Wrap a raw host identifier.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host identifier.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::ContainerId;

    #[test]
    fn display_includes_raw_id() {
        assert_eq!(ContainerId::new(7).to_string(), "container#7");
        assert_eq!(ContainerId::new(7).get(), 7);
    }
}
