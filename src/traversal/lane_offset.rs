use bevy::log::debug;
use bevy::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::core::path_error::PathError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LaneSettings {
    pub lane_count: usize,
    pub lane_width: f32,
    // Seconds for a single lane swap.
    pub lane_swap_time: f32,
    // Defaults to the centre lane.
    pub start_lane: Option<usize>,
}

impl Default for LaneSettings {
    fn default() -> Self {
        LaneSettings { lane_count: 3, lane_width: 2.0, lane_swap_time: 0.25, start_lane: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanePhase {
    #[default]
    Idle,
    Transitioning,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneState {
    pub current_index: usize,
    pub target_index: usize,
    pub current_offset: f32,
    pub transition_progress: f32,
    // -1, 0 or +1: at most one step waits behind the running transition.
    pub buffered_step: i8,
    pub phase: LanePhase,
}

/// Discrete lane index with an eased lateral offset between lanes.
#[derive(Component, Debug, Clone)]
pub struct LaneOffsetController {
    settings: LaneSettings,
    state: LaneState,
    from_offset: f32,
    elapsed: f32,
}

impl LaneOffsetController {
    pub fn new(settings: LaneSettings) -> Result<Self, PathError> {
        if settings.lane_count == 0 {
            return Err(PathError::InvalidInput("lane_count must be at least 1".to_string()));
        }
        if !(settings.lane_width.is_finite() && settings.lane_width >= 0.0) {
            return Err(PathError::InvalidInput(format!(
                "lane_width must be non-negative, got {}",
                settings.lane_width
            )));
        }

        let start = settings.start_lane.unwrap_or(center_index(settings.lane_count)).min(settings.lane_count - 1);
        let mut controller = LaneOffsetController {
            settings,
            state: LaneState {
                current_index: start,
                target_index: start,
                current_offset: 0.0,
                transition_progress: 0.0,
                buffered_step: 0,
                phase: LanePhase::Idle,
            },
            from_offset: 0.0,
            elapsed: 0.0,
        };
        controller.state.current_offset = controller.offset_for_lane(start);
        Ok(controller)
    }

    pub fn settings(&self) -> &LaneSettings {
        &self.settings
    }

    pub fn state(&self) -> LaneState {
        self.state
    }

    pub fn current_offset(&self) -> f32 {
        self.state.current_offset
    }

    pub fn current_lane(&self) -> usize {
        self.state.current_index
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.phase == LanePhase::Transitioning
    }

    /// Offset of lane `index` from the centreline; symmetric around zero for odd lane counts.
    pub fn offset_for_lane(&self, index: usize) -> f32 {
        let index = index.min(self.settings.lane_count - 1) as i64;
        let center = center_index(self.settings.lane_count) as i64;
        (index - center) as f32 * self.settings.lane_width
    }

    /// Requests an absolute lane. While a transition runs this collapses into a single buffered step.
    pub fn request_lane(&mut self, index: usize) {
        let index = index.min(self.settings.lane_count - 1);
        match self.state.phase {
            LanePhase::Idle => self.start_transition(index),
            LanePhase::Transitioning => {
                let step = (index as i64 - self.state.target_index as i64).signum() as i8;
                self.buffer_step(step);
            }
        }
    }

    /// Requests a move of one lane in the direction of `direction`'s sign.
    pub fn request_step(&mut self, direction: i8) {
        let step = direction.signum();
        if step == 0 {
            return;
        }
        match self.state.phase {
            LanePhase::Idle => {
                let target = self.stepped(self.state.current_index, step);
                self.start_transition(target);
            }
            LanePhase::Transitioning => self.buffer_step(step),
        }
    }

    /// Jumps straight to a lane, dropping any transition and buffered step.
    pub fn snap_to_lane(&mut self, index: usize) {
        let index = index.min(self.settings.lane_count - 1);
        self.state = LaneState {
            current_index: index,
            target_index: index,
            current_offset: self.offset_for_lane(index),
            transition_progress: 0.0,
            buffered_step: 0,
            phase: LanePhase::Idle,
        };
        self.elapsed = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.state.phase != LanePhase::Transitioning {
            return;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.elapsed += dt;

        let u = if self.settings.lane_swap_time > 0.0 {
            (self.elapsed / self.settings.lane_swap_time).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.state.transition_progress = u;

        if u >= 1.0 {
            self.finish_transition();
            return;
        }

        let eased = u * u * (3.0 - 2.0 * u);
        let to_offset = self.offset_for_lane(self.state.target_index);
        self.state.current_offset = self.from_offset + (to_offset - self.from_offset) * eased;
    }

    fn start_transition(&mut self, target: usize) {
        if target == self.state.current_index && self.state.current_offset == self.offset_for_lane(target) {
            return;
        }
        debug!("[Lanes] lane {} -> {}", self.state.current_index, target);
        self.from_offset = self.state.current_offset;
        self.elapsed = 0.0;
        self.state.target_index = target;
        self.state.transition_progress = 0.0;
        self.state.phase = LanePhase::Transitioning;

        if self.settings.lane_swap_time <= 0.0 {
            self.finish_transition();
        }
    }

    fn finish_transition(&mut self) {
        self.state.current_index = self.state.target_index;
        self.state.current_offset = self.offset_for_lane(self.state.current_index);
        self.state.transition_progress = 1.0;
        self.state.phase = LanePhase::Idle;

        let step = std::mem::take(&mut self.state.buffered_step);
        if step != 0 {
            let next = self.stepped(self.state.current_index, step);
            self.start_transition(next);
        }
    }

    fn buffer_step(&mut self, step: i8) {
        if step != 0 {
            self.state.buffered_step = step;
        }
    }

    fn stepped(&self, from: usize, step: i8) -> usize {
        let last = self.settings.lane_count as i64 - 1;
        (from as i64 + step as i64).clamp(0, last) as usize
    }
}

fn center_index(lane_count: usize) -> usize {
    lane_count.saturating_sub(1) / 2
}
