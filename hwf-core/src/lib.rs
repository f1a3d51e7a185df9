pub mod config;
pub mod daily;
pub mod date_range;
pub mod district;
pub mod error;
pub mod observation;
