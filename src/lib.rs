pub mod action;
pub mod mac;
pub mod net;
pub mod wol;
