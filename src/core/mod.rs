//! Pure pieces shared by every platform: registry, config, ABI, view.

pub mod config;
pub mod contract;
pub mod networks;
pub mod view;
