pub mod frame;
pub mod ops;
