pub mod noop;
pub mod sys;
pub mod udp;

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

/// UDP port magic packets are sent to (the "discard" service).
pub const WOL_PORT: u16 = 9;

/// IPv4 all-hosts group.
pub const ALL_HOSTS_V4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 1);
/// IPv6 link-local all-nodes group.
pub const ALL_NODES_V6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperStatus {
    Up,
    Down,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterfaceKind {
    Loopback,
    Physical,
}

/// A multicast group the interface is a member of. IPv6 groups carry the
/// zone they were joined on; IPv4 groups always have a scope id of 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MulticastAddress {
    pub addr: IpAddr,
    pub scope_id: u32,
}

impl MulticastAddress {
    pub fn v4(addr: Ipv4Addr) -> Self {
        MulticastAddress {
            addr: IpAddr::V4(addr),
            scope_id: 0,
        }
    }

    pub fn v6(addr: Ipv6Addr, scope_id: u32) -> Self {
        MulticastAddress {
            addr: IpAddr::V6(addr),
            scope_id,
        }
    }

    /// Where a magic packet goes if this group is one we broadcast to:
    /// `224.0.0.1:9` or `[ff02::1%scope]:9`.
    fn wake_destination(&self) -> Option<SocketAddr> {
        match self.addr {
            IpAddr::V4(addr) if addr == ALL_HOSTS_V4 => {
                Some(SocketAddr::V4(SocketAddrV4::new(addr, WOL_PORT)))
            }
            IpAddr::V6(addr) if addr == ALL_NODES_V6 && self.scope_id != 0 => Some(
                SocketAddr::V6(SocketAddrV6::new(addr, WOL_PORT, 0, self.scope_id)),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for MulticastAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.addr {
            IpAddr::V6(addr) if self.scope_id != 0 => write!(f, "{}%{}", addr, self.scope_id),
            addr => write!(f, "{}", addr),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnicastAddress {
    pub addr: IpAddr,
}

impl UnicastAddress {
    pub fn new(addr: IpAddr) -> Self {
        UnicastAddress { addr }
    }

    pub fn is_ipv6_link_local(&self) -> bool {
        match self.addr {
            IpAddr::V6(addr) => (addr.segments()[0] & 0xffc0) == 0xfe80,
            IpAddr::V4(_) => false,
        }
    }
}

/// 169.254.0.0/16, the range self-assigned when no address could be
/// obtained.
pub fn is_automatic_private(addr: Ipv4Addr) -> bool {
    let [a, b, _, _] = addr.octets();
    a == 169 && b == 254
}

/// Snapshot of one local adapter, taken fresh for every send.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkInterfaceInfo {
    pub name: String,
    pub index: u32,
    pub status: OperStatus,
    pub kind: InterfaceKind,
    pub multicast: Vec<MulticastAddress>,
    pub unicast: Vec<UnicastAddress>,
    /// The IPv4 side of the interface is running on a self-assigned
    /// 169.254.x.x address.
    pub ipv4_autoconfig: bool,
}

impl NetworkInterfaceInfo {
    pub fn is_eligible(&self) -> bool {
        self.kind != InterfaceKind::Loopback && self.status == OperStatus::Up
    }

    /// First unicast address usable as the source for a datagram to
    /// `destination`.
    fn source_for(&self, destination: &SocketAddr) -> Option<IpAddr> {
        self.unicast
            .iter()
            .find(|u| match (destination, u.addr) {
                (SocketAddr::V4(_), IpAddr::V4(_)) => !self.ipv4_autoconfig,
                (SocketAddr::V6(_), IpAddr::V6(_)) => !u.is_ipv6_link_local(),
                _ => false,
            })
            .map(|u| u.addr)
    }

    /// Picks the pair a magic packet should be sent with: the first
    /// multicast group we recognize that also has a usable source address.
    pub fn select_target(&self) -> Option<TransmissionTarget> {
        self.multicast.iter().find_map(|group| {
            let destination = group.wake_destination()?;
            let source = self.source_for(&destination)?;
            Some(TransmissionTarget {
                source,
                destination,
            })
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransmissionTarget {
    pub source: IpAddr,
    pub destination: SocketAddr,
}

impl fmt::Display for TransmissionTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

pub trait InterfaceSource {
    fn interfaces(&self) -> io::Result<Vec<NetworkInterfaceInfo>>;
}

impl InterfaceSource for Vec<NetworkInterfaceInfo> {
    fn interfaces(&self) -> io::Result<Vec<NetworkInterfaceInfo>> {
        Ok(self.clone())
    }
}

pub trait DatagramSender {
    fn send_to(&self, target: &TransmissionTarget, payload: &[u8]) -> io::Result<()>;
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::net::*;

    pub fn ethernet(name: &str, index: u32) -> NetworkInterfaceInfo {
        NetworkInterfaceInfo {
            name: name.to_string(),
            index,
            status: OperStatus::Up,
            kind: InterfaceKind::Physical,
            multicast: vec![],
            unicast: vec![],
            ipv4_autoconfig: false,
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8) -> UnicastAddress {
        UnicastAddress::new(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
    }

    fn v6(s: &str) -> UnicastAddress {
        UnicastAddress::new(IpAddr::V6(s.parse().unwrap()))
    }

    #[test]
    fn test_select_ipv4() {
        let mut iface = ethernet("eth0", 2);
        iface.multicast = vec![MulticastAddress::v4(ALL_HOSTS_V4)];
        iface.unicast = vec![v6("2001:db8::2"), v4(192, 168, 1, 20)];
        assert_eq!(
            iface.select_target(),
            Some(TransmissionTarget {
                source: "192.168.1.20".parse().unwrap(),
                destination: "224.0.0.1:9".parse().unwrap(),
            })
        );
    }

    #[test]
    fn test_select_skips_autoconfig_ipv4() {
        let mut iface = ethernet("eth0", 2);
        iface.multicast = vec![MulticastAddress::v4(ALL_HOSTS_V4)];
        iface.unicast = vec![v4(169, 254, 10, 3)];
        iface.ipv4_autoconfig = true;
        assert_eq!(iface.select_target(), None);
    }

    #[test]
    fn test_select_ipv6_needs_global_source() {
        let mut iface = ethernet("eth0", 3);
        iface.multicast = vec![MulticastAddress::v6(ALL_NODES_V6, 3)];
        iface.unicast = vec![v6("fe80::1")];
        assert_eq!(iface.select_target(), None);

        iface.unicast.push(v6("2001:db8::5"));
        let target = iface.select_target().unwrap();
        assert_eq!(target.source, "2001:db8::5".parse::<IpAddr>().unwrap());
        assert_eq!(
            target.destination,
            SocketAddr::V6(SocketAddrV6::new(ALL_NODES_V6, 9, 0, 3))
        );
    }

    #[test]
    fn test_select_falls_through_to_next_group() {
        let mut iface = ethernet("eth0", 4);
        iface.multicast = vec![
            MulticastAddress::v4(Ipv4Addr::new(224, 0, 0, 251)),
            MulticastAddress::v6(ALL_NODES_V6, 4),
            MulticastAddress::v4(ALL_HOSTS_V4),
        ];
        // No global IPv6 address, so the ff02::1 group is passed over.
        iface.unicast = vec![v6("fe80::aa"), v4(10, 0, 0, 7)];
        let target = iface.select_target().unwrap();
        assert_eq!(target.destination, "224.0.0.1:9".parse().unwrap());
    }

    #[test]
    fn test_select_first_match_wins() {
        let mut iface = ethernet("eth0", 5);
        iface.multicast = vec![
            MulticastAddress::v6(ALL_NODES_V6, 5),
            MulticastAddress::v4(ALL_HOSTS_V4),
        ];
        iface.unicast = vec![v4(10, 0, 0, 7), v6("2001:db8::7")];
        let target = iface.select_target().unwrap();
        assert_eq!(target.source, "2001:db8::7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_unscoped_ipv6_group_ignored() {
        let mut iface = ethernet("eth0", 5);
        iface.multicast = vec![MulticastAddress::v6(ALL_NODES_V6, 0)];
        iface.unicast = vec![v6("2001:db8::7")];
        assert_eq!(iface.select_target(), None);
    }

    #[test]
    fn test_eligibility() {
        let up = ethernet("eth0", 2);
        assert!(up.is_eligible());

        let mut down = ethernet("eth1", 3);
        down.status = OperStatus::Down;
        assert!(!down.is_eligible());

        let mut lo = ethernet("lo", 1);
        lo.kind = InterfaceKind::Loopback;
        assert!(!lo.is_eligible());
    }

    #[test]
    fn test_display() {
        assert_eq!(MulticastAddress::v4(ALL_HOSTS_V4).to_string(), "224.0.0.1");
        assert_eq!(MulticastAddress::v6(ALL_NODES_V6, 2).to_string(), "ff02::1%2");
        assert!(v6("fe80::1:2").is_ipv6_link_local());
        assert!(!v6("fec0::1").is_ipv6_link_local());
        assert!(is_automatic_private(Ipv4Addr::new(169, 254, 0, 9)));
        assert!(!is_automatic_private(Ipv4Addr::new(169, 253, 0, 9)));
    }
}
