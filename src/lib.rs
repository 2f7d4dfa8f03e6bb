pub mod entity;
pub mod seed;
