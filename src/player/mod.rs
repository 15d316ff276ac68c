//! Player record module

mod record;


pub use record::*;
