pub mod resources;
pub mod views;
