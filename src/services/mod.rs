pub mod generator_service;
pub mod record_service;
