//! Economy module

mod engine;


pub use engine::*;
