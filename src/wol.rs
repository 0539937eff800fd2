use crate::mac::{MacAddress, ParseError};
use crate::net::{DatagramSender, InterfaceSource, TransmissionTarget};
use log::{debug, info, warn};
use std::io;

const SYNCHRONIZATION_SCHEME: [u8; 6] = [0xff; 6];
const MAC_REPETITIONS: usize = 16;
pub const MAGIC_PACKET_LEN: usize = SYNCHRONIZATION_SCHEME.len() + 6 * MAC_REPETITIONS;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid MAC address: {0}")]
    InvalidMac(#[from] ParseError),
    #[error("Could not enumerate network interfaces: {0}")]
    Enumerate(#[from] io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn new(mac_address: MacAddress) -> Self {
        let mut data = [0u8; MAGIC_PACKET_LEN];
        data[..SYNCHRONIZATION_SCHEME.len()].copy_from_slice(&SYNCHRONIZATION_SCHEME);
        for chunk in data[SYNCHRONIZATION_SCHEME.len()..].chunks_exact_mut(6) {
            chunk.copy_from_slice(&mac_address.octets());
        }
        MagicPacket(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

pub fn build_magic_packet(mac_address: &str) -> Result<MagicPacket, Error> {
    Ok(MagicPacket::new(mac_address.parse()?))
}

#[derive(Debug)]
pub enum Delivery {
    Sent(TransmissionTarget),
    Failed(TransmissionTarget, io::Error),
    /// Up and not loopback, but no multicast group had a usable source.
    NoTarget,
}

#[derive(Debug)]
pub struct InterfaceReport {
    pub interface: String,
    pub delivery: Delivery,
}

#[derive(Debug, Default)]
pub struct WakeReport {
    pub interfaces: Vec<InterfaceReport>,
}

impl WakeReport {
    pub fn sent(&self) -> usize {
        self.interfaces
            .iter()
            .filter(|r| matches!(r.delivery, Delivery::Sent(_)))
            .count()
    }

    /// Nothing went out on the wire.
    pub fn is_noop(&self) -> bool {
        self.sent() == 0
    }
}

/// Sends the magic packet for `mac_address` out of every interface that is
/// up, isn't loopback and has a recognized multicast group, at most one
/// datagram per interface. A failure on one interface never stops the rest.
pub fn send_wake_on_lan(
    mac_address: &str,
    source: &dyn InterfaceSource,
    sender: &dyn DatagramSender,
) -> Result<WakeReport, Error> {
    let packet = build_magic_packet(mac_address)?;
    let mut report = WakeReport::default();
    for iface in source.interfaces()?.iter().filter(|i| i.is_eligible()) {
        let delivery = match iface.select_target() {
            None => {
                debug!("{}: no usable multicast group", iface.name);
                Delivery::NoTarget
            }
            Some(target) => match sender.send_to(&target, packet.as_bytes()) {
                Ok(()) => {
                    info!("{}: magic packet sent {}", iface.name, target);
                    Delivery::Sent(target)
                }
                Err(e) => {
                    warn!("{}: sending {} failed: {}", iface.name, target, e);
                    Delivery::Failed(target, e)
                }
            },
        };
        report.interfaces.push(InterfaceReport {
            interface: iface.name.clone(),
            delivery,
        });
    }
    Ok(report)
}
