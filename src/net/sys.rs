// Interface enumeration for the running host.
//
// getifaddrs(3) gives us flags and unicast addresses but not multicast group
// membership, which Linux only exposes through procfs. The formats are the
// ones written by igmp_mc_seq_show (net/ipv4/igmp.c) and igmp6_mc_seq_show
// (net/ipv6/mcast.c).

use crate::net::{
    is_automatic_private, InterfaceKind, InterfaceSource, MulticastAddress,
    NetworkInterfaceInfo, OperStatus, UnicastAddress,
};
use log::debug;
use nix::ifaddrs::getifaddrs;
use nix::net::if_::{if_nametoindex, InterfaceFlags};
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};
use std::path::{Path, PathBuf};

const PROC_NET_IGMP: &str = "/proc/net/igmp";
const PROC_NET_IGMP6: &str = "/proc/net/igmp6";

pub struct SystemInterfaces {
    igmp_path: PathBuf,
    igmp6_path: PathBuf,
}

impl Default for SystemInterfaces {
    fn default() -> Self {
        SystemInterfaces {
            igmp_path: PROC_NET_IGMP.into(),
            igmp6_path: PROC_NET_IGMP6.into(),
        }
    }
}

impl SystemInterfaces {
    pub fn new() -> Self {
        Default::default()
    }

    fn read_groups(path: &Path) -> io::Result<String> {
        match fs::read_to_string(path) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} not available, assuming no multicast groups", path.display());
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }
}

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> io::Result<Vec<NetworkInterfaceInfo>> {
        let entries = getifaddrs()?.map(|ifaddr| {
            let addr = ifaddr.address.and_then(|storage| {
                if let Some(sin) = storage.as_sockaddr_in() {
                    Some(IpAddr::V4(*SocketAddrV4::from(*sin).ip()))
                } else {
                    storage
                        .as_sockaddr_in6()
                        .map(|sin6| IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
                }
            });
            (ifaddr.interface_name, ifaddr.flags, addr)
        });
        let mut interfaces = group_by_device(entries, interface_index);

        let v4_groups = parse_igmp(&Self::read_groups(&self.igmp_path)?);
        let v6_groups = parse_igmp6(&Self::read_groups(&self.igmp6_path)?);
        for iface in interfaces.iter_mut() {
            iface.multicast.extend(
                v4_groups
                    .iter()
                    .chain(v6_groups.iter())
                    .filter(|(name, _)| *name == iface.name)
                    .map(|(_, group)| *group),
            );
            debug!(
                "{} (index {}, {:?}, {:?}): {} unicast, {} multicast",
                iface.name,
                iface.index,
                iface.status,
                iface.kind,
                iface.unicast.len(),
                iface.multicast.len()
            );
        }
        Ok(interfaces)
    }
}

fn interface_index(name: &str) -> u32 {
    match if_nametoindex(name) {
        Ok(index) => index,
        Err(e) => {
            debug!("no index for {}: {}", name, e);
            0
        }
    }
}

/// Labeled IPv4 aliases are reported as `eth0:1`; they belong to `eth0`.
fn device_name(label: &str) -> &str {
    label.split(':').next().unwrap_or(label)
}

/// Folds getifaddrs entries into one snapshot per device, in first-seen
/// order.
fn group_by_device<I, F>(entries: I, index_of: F) -> Vec<NetworkInterfaceInfo>
where
    I: IntoIterator<Item = (String, InterfaceFlags, Option<IpAddr>)>,
    F: Fn(&str) -> u32,
{
    let mut interfaces: Vec<NetworkInterfaceInfo> = vec![];
    for (label, flags, addr) in entries {
        let name = device_name(&label);
        let pos = match interfaces.iter().position(|i| i.name == name) {
            Some(pos) => pos,
            None => {
                interfaces.push(new_interface(name, index_of(name), flags));
                interfaces.len() - 1
            }
        };
        if let Some(addr) = addr {
            interfaces[pos].unicast.push(UnicastAddress::new(addr));
        }
    }
    for iface in interfaces.iter_mut() {
        iface.ipv4_autoconfig = uses_automatic_private(&iface.unicast);
    }
    interfaces
}

fn new_interface(name: &str, index: u32, flags: InterfaceFlags) -> NetworkInterfaceInfo {
    let status = if flags.contains(InterfaceFlags::IFF_UP | InterfaceFlags::IFF_RUNNING) {
        OperStatus::Up
    } else {
        OperStatus::Down
    };
    let kind = if flags.contains(InterfaceFlags::IFF_LOOPBACK) {
        InterfaceKind::Loopback
    } else {
        InterfaceKind::Physical
    };
    NetworkInterfaceInfo {
        name: name.to_string(),
        index,
        status,
        kind,
        multicast: vec![],
        unicast: vec![],
        ipv4_autoconfig: false,
    }
}

/// An interface is autoconfigured when every IPv4 address it holds is
/// self-assigned.
fn uses_automatic_private(unicast: &[UnicastAddress]) -> bool {
    let mut v4 = unicast.iter().filter_map(|u| match u.addr {
        IpAddr::V4(addr) => Some(addr),
        IpAddr::V6(_) => None,
    });
    match v4.next() {
        None => false,
        Some(first) => is_automatic_private(first) && v4.all(is_automatic_private),
    }
}

/// Parses /proc/net/igmp. Device lines look like `2\teth0      :     1      V3`
/// and are followed by indented group lines whose first column is the group
/// address as a native-endian `%08X`.
fn parse_igmp(contents: &str) -> Vec<(String, MulticastAddress)> {
    let mut groups = vec![];
    let mut device: Option<String> = None;
    for line in contents.lines().skip(1) {
        if line.starts_with(char::is_whitespace) {
            let Some(name) = &device else { continue };
            let Some(hex) = line.split_whitespace().next() else { continue };
            if let Ok(raw) = u32::from_str_radix(hex, 16) {
                let addr = Ipv4Addr::from(raw.to_ne_bytes());
                groups.push((name.clone(), MulticastAddress::v4(addr)));
            }
        } else {
            device = line
                .split(':')
                .next()
                .and_then(|head| head.split_whitespace().nth(1))
                .map(str::to_string);
        }
    }
    groups
}

/// Parses /proc/net/igmp6: `idx name group users flags timer`, group being 32
/// hex digits in network order.
fn parse_igmp6(contents: &str) -> Vec<(String, MulticastAddress)> {
    contents
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let index = fields.next()?.parse::<u32>().ok()?;
            let name = fields.next()?;
            let raw = u128::from_str_radix(fields.next()?, 16).ok()?;
            Some((
                name.to_string(),
                MulticastAddress::v6(Ipv6Addr::from(raw), index),
            ))
        })
        .collect()
}
