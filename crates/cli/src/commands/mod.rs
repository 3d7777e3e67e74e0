//! Command implementations

pub mod bump;
pub mod sphinx;
pub mod wave;
