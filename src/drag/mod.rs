pub mod controller;
pub mod geometry;
pub mod gesture;
pub mod script;
