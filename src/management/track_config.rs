use std::collections::HashMap;
use std::fs::File;
use std::sync::Mutex;

use lazy_static::lazy_static;
use ron::de::{from_reader, from_str, SpannedError};
use serde::{Deserialize, Serialize};

use crate::building::curve_fitter::FittingSettings;
use crate::building::ground_projection::ProjectionSettings;
use crate::building::waypoint_orderer::OrderingSettings;
use crate::core::components::TrackSettings;
use crate::core::path_error::PathError;
use crate::traversal::lane_input::LaneInputGate;
use crate::traversal::lane_offset::{LaneOffsetController, LaneSettings};
use crate::traversal::path_follower::{FollowerSettings, PathFollower};

lazy_static! {
    static ref TRACK_CONFIG_CACHE: Mutex<HashMap<String, TrackConfig>> = Mutex::new(HashMap::new());
}

/// What to do with a build whose chain had to exceed `max_link_distance`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardViolationPolicy {
    #[default]
    Accept,
    Abort,
}

/// Everything a track and its followers need, as read from `assets/tracks/<name>.ron`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TrackConfig {
    pub ordering: OrderingSettings,
    pub fitting: FittingSettings,
    pub projection: ProjectionSettings,
    pub guard_policy: GuardViolationPolicy,
    pub follower: FollowerSettings,
    pub lanes: LaneSettings,
    pub input: LaneInputGate,
}

impl TrackConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, PathError> {
        let parsed: Result<TrackConfig, SpannedError> = from_str(source);
        let config = parsed?;
        config.validate()?;
        Ok(config)
    }

    // Sections that parse but would misbehave at runtime are config errors.
    pub fn validate(&self) -> Result<(), PathError> {
        self.input
            .validate()
            .map_err(|e| PathError::Config(format!("input section: {}", e)))
    }

    pub fn track_settings(&self) -> TrackSettings {
        TrackSettings {
            ordering: self.ordering.clone(),
            fitting: self.fitting.clone(),
            projection: self.projection.clone(),
            guard_policy: self.guard_policy,
            up: self.follower.up,
        }
    }

    pub fn follower(&self) -> PathFollower {
        PathFollower::new(self.follower.clone())
    }

    pub fn lane_controller(&self) -> Result<LaneOffsetController, PathError> {
        LaneOffsetController::new(self.lanes.clone())
    }

    pub fn lane_input(&self) -> Result<LaneInputGate, PathError> {
        LaneInputGate::new(self.input.press_threshold, self.input.release_threshold)
    }
}

pub fn load_track_config(track_name: &str) -> Result<TrackConfig, PathError> {
    let mut cache = TRACK_CONFIG_CACHE
        .lock()
        .map_err(|_| PathError::Config("track config cache poisoned".to_string()))?;

    if let Some(cached_config) = cache.get(track_name) {
        return Ok(cached_config.clone());
    }

    let file_path = format!("assets/tracks/{}.ron", track_name);
    let file = File::open(&file_path)?;
    let deserialized: Result<TrackConfig, SpannedError> = from_reader(file);

    match deserialized {
        Ok(config) => {
            config.validate()?;
            cache.insert(track_name.to_string(), config.clone());
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}
