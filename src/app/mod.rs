pub mod names_service;
pub mod render;
