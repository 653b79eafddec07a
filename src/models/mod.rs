//! Data structures for decoded MRT, BGP4MP, BGP and RIB messages.
mod aspath;
mod attributes;
mod bgp;
mod mrt;
mod network;

pub use aspath::*;
pub use attributes::*;
pub use bgp::*;
pub use mrt::*;
pub use network::*;
