//! Syntax checks for the address and port range arguments.
//!
//! The predicates only look at the shape of the input. [`parse_ipv4`] and
//! [`parse_port_range`] build the typed values and reject the inputs that
//! are well-formed but unusable.
use std::net::Ipv4Addr;

use crate::error::ScanError;
use crate::target::PortRange;

/// Returns true when `s` is four dot-separated groups of one to three
/// decimal digits, each no greater than 255.
///
/// Leading zeros are allowed and read as decimal, so `010.0.0.1` is the
/// same address as `10.0.0.1`.
///
/// ```rust
/// # use rangescan::validate::is_valid_ipv4;
/// assert!(is_valid_ipv4("192.168.1.1"));
/// assert!(!is_valid_ipv4("256.1.1.1"));
/// assert!(!is_valid_ipv4("1.2.3"));
/// ```
pub fn is_valid_ipv4(s: &str) -> bool {
    octets(s).is_some()
}

/// Returns true when `s` is `<digits>-<digits>`.
///
/// The numeric values and their order are not checked here, see
/// [`parse_port_range`].
///
/// ```rust
/// # use rangescan::validate::is_valid_port_range;
/// assert!(is_valid_port_range("1-65535"));
/// assert!(is_valid_port_range("99999-1"));
/// assert!(!is_valid_port_range("abc-1"));
/// ```
pub fn is_valid_port_range(s: &str) -> bool {
    split_range(s).is_some()
}

pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr, ScanError> {
    octets(s)
        .map(Ipv4Addr::from)
        .ok_or_else(|| ScanError::InvalidAddress(s.to_owned()))
}

/// Parses `<start>-<end>` into an inclusive [`PortRange`].
///
/// Values above 65535 and reversed ranges are rejected rather than clamped.
pub fn parse_port_range(s: &str) -> Result<PortRange, ScanError> {
    let (start, end) = split_range(s)
        .ok_or_else(|| ScanError::port_range(s, "expected '<start>-<end>', e.g. 1-1000"))?;

    let start: u16 = start
        .parse()
        .map_err(|_| ScanError::port_range(s, format!("start port {start} is above 65535")))?;
    let end: u16 = end
        .parse()
        .map_err(|_| ScanError::port_range(s, format!("end port {end} is above 65535")))?;

    PortRange::new(start, end).ok_or_else(|| {
        ScanError::port_range(
            s,
            format!("start port {start} is greater than end port {end}"),
        )
    })
}

fn octets(s: &str) -> Option<[u8; 4]> {
    let mut out = [0u8; 4];
    let mut groups = s.split('.');

    for slot in &mut out {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !all_digits(group) {
            return None;
        }
        // at most three digits, so this only fails above 255
        *slot = group.parse().ok()?;
    }

    groups.next().is_none().then_some(out)
}

fn split_range(s: &str) -> Option<(&str, &str)> {
    let (start, end) = s.split_once('-')?;
    (!start.is_empty() && !end.is_empty() && all_digits(start) && all_digits(end))
        .then_some((start, end))
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parameterized::parameterized;

    #[parameterized(input = {
        "192.168.1.1", "0.0.0.0", "255.255.255.255", "127.0.0.1", "8.8.8.8",
    })]
    fn accepts_ipv4(input: &str) {
        assert!(is_valid_ipv4(input));
    }

    #[parameterized(input = {
        "256.1.1.1", "1.2.3", "1.2.3.4.5", "", "1..2.3", "a.b.c.d", "1.2.3.-4",
        " 1.2.3.4", "1.2.3.4 ", "1000.1.1.1", "1.2.3.4.", "+1.2.3.4", "localhost",
    })]
    fn rejects_ipv4(input: &str) {
        assert!(!is_valid_ipv4(input));
    }

    // Leading zeros are kept permissive and read as decimal, never octal.
    #[test]
    fn leading_zeros_are_decimal() {
        assert!(is_valid_ipv4("01.2.3.4"));
        assert!(is_valid_ipv4("010.000.001.255"));
        assert_eq!(parse_ipv4("010.0.0.1").unwrap(), Ipv4Addr::new(10, 0, 0, 1));
        assert!(!is_valid_ipv4("0001.2.3.4"));
    }

    #[parameterized(input = {
        "1-65535", "2000-2000", "0-0", "99999-1", "007-8",
    })]
    fn accepts_port_range_syntax(input: &str) {
        assert!(is_valid_port_range(input));
    }

    #[parameterized(input = {
        "abc-1", "1-", "-1", "1", "1-2-3", "1 - 2", "", "-", "1-2a", "+1-2",
    })]
    fn rejects_port_range_syntax(input: &str) {
        assert!(!is_valid_port_range(input));
    }

    #[test]
    fn parses_full_range() {
        let range = parse_port_range("1-65535").unwrap();
        assert_eq!(range.start(), 1);
        assert_eq!(range.end(), 65535);
        assert_eq!(range.len(), 65535);
    }

    #[test]
    fn parses_single_port_range() {
        let range = parse_port_range("2000-2000").unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![2000]);
    }

    // Syntax passes but the value is not a port: rejected, not clamped.
    #[test]
    fn rejects_out_of_range_port() {
        let err = parse_port_range("1-99999").unwrap_err();
        assert!(matches!(err, ScanError::InvalidPortRange { .. }));
        assert!(err.to_string().contains("end port 99999 is above 65535"));
    }

    #[test]
    fn rejects_reversed_range() {
        let err = parse_port_range("5-1").unwrap_err();
        assert!(err
            .to_string()
            .contains("start port 5 is greater than end port 1"));
    }

    #[test]
    fn rejects_bad_syntax_with_hint() {
        let err = parse_port_range("abc-1").unwrap_err();
        assert!(err.to_string().contains("expected '<start>-<end>'"));
    }

    #[test]
    fn invalid_ipv4_is_invalid_address() {
        assert!(matches!(
            parse_ipv4("300.1.1.1"),
            Err(ScanError::InvalidAddress(s)) if s == "300.1.1.1"
        ));
    }
}
