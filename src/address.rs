//! Turns the address argument into the single IPv4 address to scan.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use hickory_resolver::{
    config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts},
    TokioAsyncResolver,
};
use log::debug;
use tokio::{fs, io};

use crate::error::ScanError;
use crate::validate::{is_valid_ipv4, parse_ipv4};

/// Parses the address argument as an IPv4 literal and falls back to a
/// name lookup when it is not one.
///
/// ```rust
/// # use rangescan::address::parse_target_address;
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let ip = parse_target_address("127.0.0.1", None).await.unwrap();
/// assert_eq!(ip, std::net::Ipv4Addr::LOCALHOST);
/// # });
/// ```
pub async fn parse_target_address(
    address: &str,
    resolver: Option<&str>,
) -> Result<Ipv4Addr, ScanError> {
    if is_valid_ipv4(address) {
        return parse_ipv4(address);
    }

    if !looks_like_host(address) {
        return Err(ScanError::InvalidAddress(address.to_owned()));
    }

    resolve(address, resolver).await
}

/// Performs one lookup for `host` and returns its first IPv4 address.
///
/// Without `resolver` the system resolver is asked. Otherwise `resolver`
/// is a path to a file of nameserver IPs or a comma-separated list of
/// them, queried over UDP.
pub async fn resolve(host: &str, resolver: Option<&str>) -> Result<Ipv4Addr, ScanError> {
    let ips: Vec<IpAddr> = match resolver {
        None => tokio::net::lookup_host((host, 80))
            .await
            .map_err(|e| ScanError::resolution(host, e))?
            .map(|socket| socket.ip())
            .collect(),
        Some(r) => get_resolver(r)
            .await
            .lookup_ip(host)
            .await
            .map_err(|e| ScanError::resolution(host, e))?
            .iter()
            .collect(),
    };

    debug!("Lookup for {host} returned {ips:?}");

    ips.into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| ScanError::resolution(host, "no IPv4 address in the answer"))
}

/// Host names are dot-separated labels of ASCII letters, digits, `-` and
/// `_`. Anything else cannot be looked up, and an all-numeric name is a
/// malformed IPv4 literal.
fn looks_like_host(address: &str) -> bool {
    !address.is_empty()
        && address.len() <= 253
        && !address.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && address.trim_end_matches('.').split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && label
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
}

async fn get_resolver(resolver: &str) -> TokioAsyncResolver {
    let mut config = ResolverConfig::new();
    let resolver_ips = match read_resolver_from_file(resolver).await {
        Ok(ips) => ips,
        Err(_) => resolver
            .split(',')
            .filter_map(|r| IpAddr::from_str(r.trim()).ok())
            .collect::<Vec<_>>(),
    };
    for ip in resolver_ips {
        config.add_name_server(NameServerConfig::new(
            SocketAddr::new(ip, 53),
            Protocol::Udp,
        ));
    }
    TokioAsyncResolver::tokio(config, ResolverOpts::default())
}

/// Parses an input file of IPs for use in DNS resolution.
async fn read_resolver_from_file(path: &str) -> io::Result<Vec<IpAddr>> {
    let ips = fs::read_to_string(path)
        .await?
        .lines()
        .filter_map(|line| IpAddr::from_str(line.trim()).ok())
        .collect();

    Ok(ips)
}
