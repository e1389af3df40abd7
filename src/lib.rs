pub mod interval;
pub mod solarman;
