pub mod components;
pub mod curve;
pub mod ordered_path;
pub mod path_error;
pub mod track_plugin;
