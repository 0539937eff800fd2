use crate::net::{DatagramSender, TransmissionTarget};
use log::debug;
use std::io;
use std::net::UdpSocket;

/// Sends each datagram from its own ephemeral socket bound to the target's
/// source address, so the kernel routes it out of that interface.
pub struct UdpSender;

impl DatagramSender for UdpSender {
    fn send_to(&self, target: &TransmissionTarget, payload: &[u8]) -> io::Result<()> {
        let socket = UdpSocket::bind((target.source, 0))?;
        let sent = socket.send_to(payload, target.destination)?;
        if sent != payload.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {} of {} bytes", sent, payload.len()),
            ));
        }
        debug!("sent {} bytes {}", sent, target);
        Ok(())
    }
}
