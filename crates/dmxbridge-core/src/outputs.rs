//! Configured Art-Net destinations.
//!
//! The set is only ever replaced wholesale. Readers take a snapshot (one
//! `Arc` clone) and keep using it for the whole forward, so a concurrent
//! replacement is either fully visible or not at all.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::net::{AddressError, broadcast_address, parse_ipv4};

/// One output entry as carried by a configuration message.
///
/// # Examples
/// ```
/// use dmxbridge_core::OutputSpec;
///
/// let spec: OutputSpec =
///     serde_json::from_str(r#"{"name":"lan","address":"10.0.0.2","mask":"255.0.0.0"}"#)?;
/// assert_eq!(spec.name, "lan");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub address: String,
    pub mask: String,
}

impl OutputSpec {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        mask: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            mask: mask.into(),
        }
    }

    /// Default outputs derived from host interfaces: external IPv4 entries only.
    pub fn from_interfaces<'a, I>(interfaces: I) -> Vec<OutputSpec>
    where
        I: IntoIterator<Item = &'a InterfaceAddr>,
    {
        interfaces
            .into_iter()
            .filter(|iface| !iface.internal)
            .filter_map(|iface| match (iface.address, iface.netmask) {
                (IpAddr::V4(address), IpAddr::V4(mask)) => Some(OutputSpec::new(
                    iface.name.clone(),
                    address.to_string(),
                    mask.to_string(),
                )),
                _ => None,
            })
            .collect()
    }
}

/// Shape of one address entry reported by host interface enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub name: String,
    pub address: IpAddr,
    pub netmask: IpAddr,
    /// Loopback or otherwise host-internal.
    pub internal: bool,
}

/// A resolved output: where forwarded frames are broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub name: String,
    pub interface_address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub broadcast_address: Ipv4Addr,
}

impl Output {
    pub fn resolve(spec: &OutputSpec) -> Result<Self, AddressError> {
        let interface_address = parse_ipv4(&spec.address)?;
        let netmask = parse_ipv4(&spec.mask)?;
        Ok(Self {
            name: spec.name.clone(),
            interface_address,
            netmask,
            broadcast_address: broadcast_address(interface_address, netmask),
        })
    }
}

#[derive(Debug, Default)]
pub struct OutputSet {
    current: RwLock<Arc<[Output]>>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `specs` and swap them in as the new set.
    ///
    /// Nothing changes when any entry fails to resolve.
    pub fn replace(&self, specs: &[OutputSpec]) -> Result<usize, AddressError> {
        let outputs = specs
            .iter()
            .map(Output::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        let count = outputs.len();
        let outputs: Arc<[Output]> = outputs.into();

        for output in outputs.iter() {
            info!(
                name = %output.name,
                interface = %output.interface_address,
                broadcast = %output.broadcast_address,
                "output configured"
            );
        }
        // A poisoned lock still guards a whole Arc; recover it.
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = outputs;
        Ok(count)
    }

    pub fn snapshot(&self) -> Arc<[Output]> {
        let current = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&current)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
