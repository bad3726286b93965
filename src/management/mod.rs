pub mod track_builder;
pub mod track_config;
