//! This crate exposes the internal functionality of the rangescan TCP
//! connect scanner.
//!
//! rangescan probes one IPv4 host across one inclusive port range and
//! reports the ports that accept a connection. It completes the TCP
//! handshake and closes the stream immediately; no data is exchanged.
//!
//! ## Architecture Overview
//!
//! The core scanning behaviour is managed by
//! [`Scanner`](crate::scanner::Scanner):
//!
//! 1. **Input Processing**: the address and range are checked by
//!    [`validate`], host names go through [`address`]
//! 2. **Port Strategy**: [`port_strategy`] decides the probe order
//! 3. **Socket Scanning**: up to `batch_size` connect probes run at once,
//!    each bounded by a timeout
//! 4. **Result Processing**: open ports are collected into an ascending
//!    [`ScanReport`](crate::scanner::ScanReport)
//!
//! ## Basic Usage Example
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use tokio_util::sync::CancellationToken;
//!
//! use rangescan::scanner::{NoProgress, ScanConfig, Scanner};
//! use rangescan::target::Target;
//! use rangescan::validate::parse_port_range;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let range = parse_port_range("1-1000").unwrap();
//! let target = Target::new(Ipv4Addr::LOCALHOST, range);
//!
//! let scanner = Scanner::new(target, ScanConfig::default());
//! let report = scanner
//!     .run(&NoProgress, &CancellationToken::new())
//!     .await
//!     .unwrap();
//!
//! println!("{} open: {}", report.count(), report.joined_ports());
//! # });
//! ```
//!
//! ## Error Handling
//!
//! Closed, filtered and unreachable ports are probe outcomes, not errors.
//! [`ScanError`](crate::error::ScanError) covers what aborts a run: bad
//! input, failed resolution, running out of sockets and a broken config
//! file.
#![allow(clippy::needless_doctest_main)]

pub mod tui;

pub mod error;

pub mod input;

pub mod validate;

pub mod target;

pub mod address;

pub mod scanner;

pub mod port_strategy;
