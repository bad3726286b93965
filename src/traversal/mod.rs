pub mod arc_length_table;
pub mod lane_input;
pub mod lane_offset;
pub mod path_follower;
