//! Probe outcomes and the aggregated scan result.
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde_derive::Serialize;
use std::net::Ipv4Addr;

use crate::target::{PortRange, Target};

/// Outcome of a single connect attempt. Refused, unreachable and timed
/// out connections are all `NotOpen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Open(u16),
    NotOpen(u16),
}

impl ProbeResult {
    pub const fn port(self) -> u16 {
        match self {
            Self::Open(port) | Self::NotOpen(port) => port,
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// Open ports of a finished (or cancelled) scan in ascending order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    ip: Ipv4Addr,
    range: PortRange,
    open_ports: Vec<u16>,
    probed: usize,
    complete: bool,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    pub fn open_ports(&self) -> &[u16] {
        &self.open_ports
    }

    pub fn count(&self) -> usize {
        self.open_ports.len()
    }

    /// Ports whose probe finished before the scan ended.
    pub fn probed(&self) -> usize {
        self.probed
    }

    /// False when the scan was cancelled before every port was probed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// `22,80,443`
    pub fn joined_ports(&self) -> String {
        self.open_ports.iter().join(",")
    }
}

/// Accumulates probe results for one target, indexed by port offset.
#[derive(Debug)]
pub(crate) struct ReportBuilder {
    target: Target,
    slots: Vec<bool>,
    probed: usize,
    started_at: DateTime<Utc>,
}

impl ReportBuilder {
    pub(crate) fn new(target: Target) -> Self {
        Self {
            target,
            slots: vec![false; target.range().len()],
            probed: 0,
            started_at: Utc::now(),
        }
    }

    pub(crate) fn record(&mut self, result: ProbeResult) {
        let range = self.target.range();
        debug_assert!(range.contains(result.port()));

        self.probed += 1;
        if result.is_open() {
            self.slots[usize::from(result.port() - range.start())] = true;
        }
    }

    pub(crate) fn probed(&self) -> usize {
        self.probed
    }

    pub(crate) fn finish(self, complete: bool) -> ScanReport {
        let start = self.target.range().start();
        let open_ports = self
            .slots
            .iter()
            .zip(start..=u16::MAX)
            .filter_map(|(&open, port)| open.then_some(port))
            .collect();

        ScanReport {
            ip: self.target.ip(),
            range: self.target.range(),
            open_ports,
            probed: self.probed,
            complete,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
