use std::net::Ipv4Addr;

use super::error::AddressError;

/// Parse a dotted-decimal IPv4 quad, reporting which part is malformed.
pub fn parse_ipv4(input: &str) -> Result<Ipv4Addr, AddressError> {
    let parts: Vec<&str> = input.trim().split('.').collect();
    if parts.len() != 4 {
        return Err(AddressError::OctetCount {
            input: input.to_string(),
            count: parts.len(),
        });
    }

    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::NonNumeric {
                input: input.to_string(),
                octet: part.to_string(),
            });
        }
        // Digits only, so the parse can only fail by overflowing u64.
        let value = part.parse::<u64>().unwrap_or(u64::MAX);
        *slot = u8::try_from(value).map_err(|_| AddressError::OutOfRange {
            input: input.to_string(),
            value,
        })?;
    }
    Ok(Ipv4Addr::from(octets))
}

/// Highest address of the subnet `address` belongs to under `netmask`.
pub fn broadcast_address(address: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    let address = u32::from(address);
    let mask = u32::from(netmask);
    let network = address & mask;
    Ipv4Addr::from(network | !mask)
}

/// Resolve the broadcast address for a dotted-decimal address/netmask pair.
///
/// # Examples
/// ```
/// use std::net::Ipv4Addr;
///
/// use dmxbridge_core::net::resolve;
///
/// let broadcast = resolve("192.168.1.10", "255.255.255.0")?;
/// assert_eq!(broadcast, Ipv4Addr::new(192, 168, 1, 255));
/// # Ok::<(), dmxbridge_core::net::AddressError>(())
/// ```
pub fn resolve(address: &str, netmask: &str) -> Result<Ipv4Addr, AddressError> {
    Ok(broadcast_address(parse_ipv4(address)?, parse_ipv4(netmask)?))
}
