//! ECMA-335 metadata decoding.
//!
//! Data flows strictly one way: the PE adapter locates the CLI header
//! ([`cor20header`]), which locates the metadata root ([`root`]), whose
//! stream directory yields the heaps and the tables stream ([`streams`]).
//! The tables stream materializes raw rows ([`tables`]), a linking pass
//! resolves their references, and the method and resource subsystems
//! ([`method`], [`resources`]) are derived views over the linked rows.
//! [`cilimage`] composes all of it.

pub mod cilimage;
pub mod cor20header;
pub mod diagnostics;
pub mod method;
pub mod resources;
pub mod root;
pub mod streams;
pub mod tables;
pub mod token;
