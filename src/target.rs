//! The host and inclusive port range a single scan runs against.
use serde_derive::Serialize;
use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

/// Inclusive range of ports, always with `start <= end`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

#[allow(clippy::len_without_is_empty)]
impl PortRange {
    /// Returns `None` when `start > end`.
    pub const fn new(start: u16, end: u16) -> Option<Self> {
        if start > end {
            return None;
        }
        Some(Self { start, end })
    }

    pub const fn start(&self) -> u16 {
        self.start
    }

    pub const fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports in the range. Never zero.
    pub const fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub const fn contains(&self, port: u16) -> bool {
        self.start <= port && port <= self.end
    }

    pub const fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: 1,
            end: u16::MAX,
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A validated host plus the ports to probe on it.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    ip: Ipv4Addr,
    range: PortRange,
}

impl Target {
    pub const fn new(ip: Ipv4Addr, range: PortRange) -> Self {
        Self { ip, range }
    }

    pub const fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub const fn range(&self) -> PortRange {
        self.range
    }
}
