//! Battlefield encounter module

mod simulator;


pub use simulator::*;
