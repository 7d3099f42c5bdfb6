pub mod bin_common;
pub mod catalog;
pub mod compact;
pub mod compare;
pub mod engine;
pub mod events;
pub mod imghash;
pub mod materialize;
pub mod reconcile;
pub mod ssim;

/// For stand-alone functionality that fit comfortably within one file.
pub mod utils;
