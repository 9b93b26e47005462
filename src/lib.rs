#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod agent;
pub mod config;
pub mod connection;
pub mod coordinator;
pub mod events;
pub mod install;
pub mod manifest;
pub mod trust;

// These modules depend on the ESP HAL, radio and timer only available with embedded feature
#[cfg(feature = "embedded")]
pub mod platform;
#[cfg(feature = "embedded")]
pub mod tasks;

#[cfg(test)]
mod scenarios;
