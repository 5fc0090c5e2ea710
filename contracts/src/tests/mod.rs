//! Test modules for the binary prediction market contract.

mod initialization;
