pub mod ensemble;
pub mod statistics;
pub mod ticks;
