//! Battle resolution module

mod resolver;


pub use resolver::*;
