pub mod bezier_track;
pub mod curve_fitter;
pub mod diagnostics;
pub mod ground_projection;
pub mod two_opt;
pub mod waypoint_orderer;
