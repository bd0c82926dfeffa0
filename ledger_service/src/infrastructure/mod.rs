pub mod bus;
pub mod persistence;
