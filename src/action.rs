use crate::mac;
use crate::net::sys::SystemInterfaces;
use crate::net::udp::UdpSender;
use crate::net::{DatagramSender, InterfaceSource};
use crate::wol::{self, WakeReport};
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const INVALID_MAC_MESSAGE: &str = "Invalid MAC Address.";
pub const SENT_MESSAGE: &str = "Wake on LAN message sent.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WakeOnLanParameters {
    // Physical address of the machine to wake, "AA:BB:CC:DD:EE:FF",
    // "AA-BB-CC-DD-EE-FF" or "AABBCCDDEEFF".
    #[serde(default)]
    pub mac_address: String,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    // Shown to the user as-is.
    pub user_message: String,
}

impl ActionResult {
    fn ok(msg: &str) -> Self {
        ActionResult {
            success: true,
            user_message: msg.to_string(),
        }
    }

    fn failed(msg: String) -> Self {
        ActionResult {
            success: false,
            user_message: msg,
        }
    }
}

pub struct WakeOnLanAction {
    interfaces: Box<dyn InterfaceSource>,
    sender: Box<dyn DatagramSender>,
}

impl Default for WakeOnLanAction {
    fn default() -> Self {
        Self::new(Box::new(SystemInterfaces::new()), Box::new(UdpSender))
    }
}

impl WakeOnLanAction {
    pub const TITLE: &'static str = "Wake on LAN";
    pub const DESCRIPTION: &'static str =
        "Sends a Wake On LAN message to a machine on the local network.";

    pub fn new(interfaces: Box<dyn InterfaceSource>, sender: Box<dyn DatagramSender>) -> Self {
        Self { interfaces, sender }
    }

    pub fn wake(&self, mac_address: &str) -> Result<WakeReport, wol::Error> {
        wol::send_wake_on_lan(mac_address, &*self.interfaces, &*self.sender)
    }

    /// Validates the parameters and sends the packet. Once the address is
    /// well formed the result is a success whether or not any interface could
    /// actually send.
    pub fn execute(&self, params: &WakeOnLanParameters) -> ActionResult {
        let mac_address = match mac::validate(&params.mac_address) {
            Ok(mac_address) => mac_address,
            Err(e) => {
                info!("rejecting {:?}: {}", params.mac_address, e);
                return ActionResult::failed(INVALID_MAC_MESSAGE.to_string());
            }
        };
        match self.wake(&mac_address.to_string()) {
            Ok(report) => {
                if report.is_noop() {
                    warn!("no interface could send the magic packet for {}", mac_address);
                } else {
                    info!("woke {} via {} interface(s)", mac_address, report.sent());
                }
                ActionResult::ok(SENT_MESSAGE)
            }
            Err(e) => ActionResult::failed(e.to_string()),
        }
    }
}
