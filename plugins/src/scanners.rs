pub mod arp;
pub mod csv;
