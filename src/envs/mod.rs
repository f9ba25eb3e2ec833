pub mod cliff_walking;
pub mod simple_golf;
