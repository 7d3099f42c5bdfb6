pub mod cancel;
pub mod fsutils;
pub mod percent;
