//! Core functionality for actual scanning behaviour.
use crate::error::ScanError;
use crate::input::{Opts, ScanOrder, DEFAULT_BATCH_SIZE, DEFAULT_TIMEOUT_MS};
use crate::port_strategy::PortStrategy;
use crate::target::Target;
use log::debug;

mod report;
pub use report::{ProbeResult, ScanReport};
use report::ReportBuilder;

use futures::{stream, StreamExt};
use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
    num::NonZero,
    pin::pin,
    time::Duration,
};
use tokio::{io::AsyncWriteExt, net::TcpStream, time};
use tokio_util::sync::CancellationToken;

/// Receives one tick per finished probe.
pub trait Progress: Sync {
    fn advance(&self);
}

impl Progress for indicatif::ProgressBar {
    fn advance(&self) {
        self.inc(1);
    }
}

/// Progress sink for callers that do not display anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&self) {}
}

/// Scanner settings, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound on probes in flight.
    pub batch_size: NonZero<u16>,
    /// Per-probe connect timeout.
    pub timeout: Duration,
    pub order: ScanOrder,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: NonZero::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZero::<u16>::MIN),
            timeout: Duration::from_millis(u64::from(DEFAULT_TIMEOUT_MS)),
            order: ScanOrder::Serial,
        }
    }
}

impl ScanConfig {
    /// Builds the scanner settings from merged options, using `batch_size`
    /// in place of the requested one (see `infer_batch_size` in main).
    pub fn from_opts(opts: &Opts, batch_size: u16) -> Self {
        Self {
            batch_size: NonZero::new(batch_size).unwrap_or(NonZero::<u16>::MIN),
            timeout: opts.timeout(),
            order: opts.scan_order,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScanConnector {
    timeout: Duration,
}

impl ScanConnector {
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Makes exactly one connect attempt to `ip:port`, so a probe never
    /// outlives `self.timeout`.
    ///
    /// Refused, reset and unreachable connections as well as timeouts map to
    /// `NotOpen`. Running out of descriptors, buffers or local ports is an
    /// error, because every later probe would fail the same way.
    pub async fn probe(&self, ip: Ipv4Addr, port: u16) -> Result<ProbeResult, ScanError> {
        let socket = SocketAddr::from((ip, port));

        match self.connect(socket).await {
            Ok(tcp_stream) => {
                debug!("Connection was successful, shutting down stream {socket}");
                if let Err(e) = { tcp_stream }.shutdown().await {
                    debug!("Shutdown stream error {e}");
                }
                Ok(ProbeResult::Open(port))
            }
            Err(e) if is_resource_exhaustion(&e) => {
                Err(ScanError::ResourceExhaustion { port, source: e })
            }
            Err(e) => {
                debug!("{socket} not open: {e}");
                Ok(ProbeResult::NotOpen(port))
            }
        }
    }

    /// Performs the connection to the socket with timeout. Dropping the
    /// connect future on timeout closes the half-made socket.
    async fn connect(&self, socket: SocketAddr) -> io::Result<TcpStream> {
        time::timeout(self.timeout, TcpStream::connect(socket)).await?
    }
}

// ENFILE, EMFILE, ENOBUFS
#[cfg(any(target_os = "linux", target_os = "android"))]
const EXHAUSTION_CODES: &[i32] = &[23, 24, 105];
#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
const EXHAUSTION_CODES: &[i32] = &[23, 24, 55];
// WSAEMFILE, WSAENOBUFS
#[cfg(windows)]
const EXHAUSTION_CODES: &[i32] = &[10024, 10055];
#[cfg(not(any(unix, windows)))]
const EXHAUSTION_CODES: &[i32] = &[];

/// Local resources ran out, as opposed to the target refusing or ignoring
/// the connection. EADDRNOTAVAIL means no ephemeral port was left to bind.
fn is_resource_exhaustion(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::AddrNotAvailable | io::ErrorKind::OutOfMemory
    ) || e
        .raw_os_error()
        .is_some_and(|code| EXHAUSTION_CODES.contains(&code))
        || e.to_string().to_lowercase().contains("too many open files")
}

/// Drives connect probes over the port range of one target.
#[derive(Debug)]
pub struct Scanner {
    target: Target,
    port_strategy: PortStrategy,
    batch_size: NonZero<u16>,
    connector: ScanConnector,
}

impl Scanner {
    pub fn new(target: Target, config: ScanConfig) -> Self {
        Self {
            target,
            port_strategy: PortStrategy::pick(target.range(), config.order),
            batch_size: config.batch_size,
            connector: ScanConnector::new(config.timeout),
        }
    }

    pub const fn target(&self) -> Target {
        self.target
    }

    /// Probes every port of the target with at most `batch_size` probes in
    /// flight and returns the open ports in ascending order.
    ///
    /// Cancelling `cancel` stops issuing probes, drops the outstanding ones
    /// and returns the partial report.
    pub async fn run(
        &self,
        progress: &dyn Progress,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let ip = self.target.ip();
        let connector = self.connector;
        let mut report = ReportBuilder::new(self.target);
        let total = self.port_strategy.range().len();

        debug!(
            "Start scanning {ip}.\nBatch size {}\nNumber of ports {total}",
            self.batch_size
        );

        let mut probes = pin!(stream::iter(self.port_strategy.order())
            .map(|port| async move { connector.probe(ip, port).await })
            .buffer_unordered(usize::from(self.batch_size.get()))
            .take_until(cancel.cancelled()));

        while let Some(result) = probes.next().await {
            report.record(result?);
            progress.advance();
        }

        let complete = report.probed() == total;
        if !complete {
            debug!("Scan cancelled after {} of {total} ports", report.probed());
        }

        let report = report.finish(complete);
        debug!("Open ports found: {:?}", report.open_ports());
        Ok(report)
    }
}
