//! Game tuning and configuration
//!
//! Persisted as JSON. Every field has a default, so a partial file only
//! overrides what it names. Values are sanitized once at load time so the
//! simulation never sees NaN or negative durations.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which obstacle phases count as dangerous for hit testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HitMode {
    #[default]
    StickOnly,
    TravelAndStick,
    TelegraphTravelStick,
    AllPhasesIncludingFade,
}

impl HitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitMode::StickOnly => "stick",
            HitMode::TravelAndStick => "travel-stick",
            HitMode::TelegraphTravelStick => "telegraph-travel-stick",
            HitMode::AllPhasesIncludingFade => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stick" | "stick-only" => Some(HitMode::StickOnly),
            "travel-stick" | "travel-and-stick" => Some(HitMode::TravelAndStick),
            "telegraph-travel-stick" => Some(HitMode::TelegraphTravelStick),
            "all" | "all-phases" => Some(HitMode::AllPhasesIncludingFade),
            _ => None,
        }
    }
}

/// One row of the stage table, active from `start_sec` of session time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage {
    pub start_sec: f32,

    // === Spawn interval (sec) ===
    pub spawn_interval_min: f32,
    pub spawn_interval_max: f32,

    // === Arc shape / timing ===
    pub arc_size_deg: f32,
    pub telegraph_time_sec: f32,
    pub travel_time_sec: f32,
    pub stick_time_sec: f32,
    pub fade_out_sec: f32,

    // === Spawn from (multiples of track radius) ===
    pub start_radius_scale: f32,
    pub telegraph_offset_scale: f32,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            start_sec: 0.0,
            spawn_interval_min: 0.75,
            spawn_interval_max: 1.20,
            arc_size_deg: 32.0,
            telegraph_time_sec: 0.25,
            travel_time_sec: 0.38,
            stick_time_sec: 0.30,
            fade_out_sec: 0.45,
            start_radius_scale: 2.0,
            telegraph_offset_scale: 1.35,
        }
    }
}

/// Complete simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base radius of the orbit track
    pub track_radius: f32,

    /// Stage table, sorted by `start_sec` after sanitizing
    pub stages: Vec<Stage>,

    // === Player speed scaling ===
    pub score_for_max_speed: f32,
    /// Player speed curve exponent (>1 holds back early growth)
    pub player_speed_gamma: f32,
    pub player_min_speed_deg_per_sec: f32,
    pub player_max_speed_deg_per_sec: f32,

    // === Global difficulty ===
    pub difficulty_gamma: f32,

    // === Collision / graze ===
    /// true: exact arc width; false: add `hit_pad_deg` and the high-speed pad
    pub use_exact_arc_hit: bool,
    pub hit_pad_deg: f32,
    pub graze_threshold_deg: f32,
    pub arc_hit_mode: HitMode,
    pub collision_substeps: u32,
    pub max_substeps: u32,
    pub high_speed_extra_pad_deg: f32,

    // === Orb / chain ===
    pub orb_score: u32,
    pub chain_step: f32,
    pub chain_max: f32,
    pub chain_reset_if_no_pickup_sec: f32,
    pub orb_lifetime_sec: f32,
    pub orb_jitter_deg: f32,
    pub orb_pickup_pad_deg: f32,

    // === Gaps / separation ===
    pub min_spawn_sep_from_player_deg: f32,

    // === Mass fade ===
    pub force_fade_all_sec: f32,
    pub fade_arcs_when_orb_picked: bool,
    pub fade_arcs_when_orb_timeout: bool,

    // === Difficulty -> arc travel speed ===
    pub travel_time_min_scale: f32,
    pub telegraph_time_min_scale: f32,
    pub travel_difficulty_gamma: f32,
    pub spawn_interval_min_scale: f32,

    // === Max concurrent arcs ===
    pub base_max_concurrent_arcs: u32,
    pub max_max_concurrent_arcs: u32,
    pub arcs_max_gamma: f32,

    // === Session ===
    pub countdown_duration: f32,
    pub flip_buffer_window: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            track_radius: 3.0,
            stages: vec![Stage::default()],

            score_for_max_speed: 220.0,
            player_speed_gamma: 1.25,
            player_min_speed_deg_per_sec: 110.0,
            player_max_speed_deg_per_sec: 300.0,

            difficulty_gamma: 0.5,

            use_exact_arc_hit: true,
            hit_pad_deg: 3.0,
            graze_threshold_deg: 6.0,
            arc_hit_mode: HitMode::StickOnly,
            collision_substeps: 3,
            max_substeps: 8,
            high_speed_extra_pad_deg: 1.0,

            orb_score: 10,
            chain_step: 0.2,
            chain_max: 3.0,
            chain_reset_if_no_pickup_sec: 5.0,
            orb_lifetime_sec: 4.0,
            orb_jitter_deg: 6.0,
            orb_pickup_pad_deg: 4.0,

            min_spawn_sep_from_player_deg: 35.0,

            force_fade_all_sec: 0.3,
            fade_arcs_when_orb_picked: false,
            fade_arcs_when_orb_timeout: true,

            travel_time_min_scale: 0.35,
            telegraph_time_min_scale: 0.60,
            travel_difficulty_gamma: 0.8,
            spawn_interval_min_scale: 0.55,

            base_max_concurrent_arcs: 3,
            max_max_concurrent_arcs: 9,
            arcs_max_gamma: 0.8,

            countdown_duration: 3.0,
            flip_buffer_window: 0.10,
        }
    }
}

/// Replace non-finite values with `fallback`, then clamp into `[min, max]`
fn clamp_field(name: &str, value: f32, fallback: f32, min: f32, max: f32) -> f32 {
    let v = if value.is_finite() { value } else { fallback };
    let clamped = v.clamp(min, max);
    if clamped != value {
        log::warn!("config: {} = {} clamped to {}", name, value, clamped);
    }
    clamped
}

impl Stage {
    /// Clamp a stage row into a state the obstacle machine can always advance
    pub fn sanitized(&self) -> Self {
        let d = Stage::default();
        let mut s = Self {
            start_sec: clamp_field("stage.start_sec", self.start_sec, 0.0, 0.0, f32::MAX),
            spawn_interval_min: clamp_field(
                "stage.spawn_interval_min",
                self.spawn_interval_min,
                d.spawn_interval_min,
                0.0,
                f32::MAX,
            ),
            spawn_interval_max: clamp_field(
                "stage.spawn_interval_max",
                self.spawn_interval_max,
                d.spawn_interval_max,
                0.0,
                f32::MAX,
            ),
            arc_size_deg: clamp_field("stage.arc_size_deg", self.arc_size_deg.abs(), d.arc_size_deg, 0.0, 360.0),
            telegraph_time_sec: clamp_field(
                "stage.telegraph_time_sec",
                self.telegraph_time_sec,
                d.telegraph_time_sec,
                0.05,
                f32::MAX,
            ),
            travel_time_sec: clamp_field("stage.travel_time_sec", self.travel_time_sec, d.travel_time_sec, 0.01, f32::MAX),
            stick_time_sec: clamp_field("stage.stick_time_sec", self.stick_time_sec, d.stick_time_sec, 0.0, f32::MAX),
            fade_out_sec: clamp_field("stage.fade_out_sec", self.fade_out_sec, d.fade_out_sec, 0.01, f32::MAX),
            start_radius_scale: clamp_field(
                "stage.start_radius_scale",
                self.start_radius_scale,
                d.start_radius_scale,
                1.25,
                f32::MAX,
            ),
            telegraph_offset_scale: clamp_field(
                "stage.telegraph_offset_scale",
                self.telegraph_offset_scale,
                d.telegraph_offset_scale,
                1.10,
                f32::MAX,
            ),
        };
        if s.spawn_interval_max < s.spawn_interval_min {
            std::mem::swap(&mut s.spawn_interval_min, &mut s.spawn_interval_max);
        }
        s
    }
}

impl Config {
    /// Parse a (possibly partial) JSON document and sanitize it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {} ({} stages)", path.display(), config.stages.len());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp every value into its safe range.
    ///
    /// An empty stage table is kept empty: the scheduler treats it as
    /// "nothing to spawn" rather than inventing a stage.
    pub fn sanitized(&self) -> Self {
        let d = Config::default();
        let mut stages: Vec<Stage> = self.stages.iter().map(Stage::sanitized).collect();
        stages.sort_by(|a, b| a.start_sec.total_cmp(&b.start_sec));

        let min_speed = clamp_field(
            "player_min_speed_deg_per_sec",
            self.player_min_speed_deg_per_sec,
            d.player_min_speed_deg_per_sec,
            0.0,
            f32::MAX,
        );
        let max_speed = clamp_field(
            "player_max_speed_deg_per_sec",
            self.player_max_speed_deg_per_sec,
            d.player_max_speed_deg_per_sec,
            0.0,
            f32::MAX,
        );
        let base_max = self.base_max_concurrent_arcs.max(1);

        Self {
            track_radius: clamp_field("track_radius", self.track_radius, d.track_radius, 0.01, f32::MAX),
            stages,

            score_for_max_speed: clamp_field("score_for_max_speed", self.score_for_max_speed, d.score_for_max_speed, 1.0, f32::MAX),
            player_speed_gamma: clamp_field("player_speed_gamma", self.player_speed_gamma, d.player_speed_gamma, 0.01, 10.0),
            player_min_speed_deg_per_sec: min_speed,
            player_max_speed_deg_per_sec: max_speed,

            difficulty_gamma: clamp_field("difficulty_gamma", self.difficulty_gamma, d.difficulty_gamma, 0.01, 10.0),

            use_exact_arc_hit: self.use_exact_arc_hit,
            hit_pad_deg: clamp_field("hit_pad_deg", self.hit_pad_deg, d.hit_pad_deg, 0.0, 180.0),
            graze_threshold_deg: clamp_field("graze_threshold_deg", self.graze_threshold_deg, d.graze_threshold_deg, 0.0, 180.0),
            arc_hit_mode: self.arc_hit_mode,
            collision_substeps: self.collision_substeps.clamp(1, 8),
            max_substeps: self.max_substeps.max(1),
            high_speed_extra_pad_deg: clamp_field(
                "high_speed_extra_pad_deg",
                self.high_speed_extra_pad_deg,
                d.high_speed_extra_pad_deg,
                0.0,
                5.0,
            ),

            orb_score: self.orb_score,
            chain_step: clamp_field("chain_step", self.chain_step, d.chain_step, 0.0, f32::MAX),
            chain_max: clamp_field("chain_max", self.chain_max, d.chain_max, 1.0, f32::MAX),
            chain_reset_if_no_pickup_sec: clamp_field(
                "chain_reset_if_no_pickup_sec",
                self.chain_reset_if_no_pickup_sec,
                d.chain_reset_if_no_pickup_sec,
                0.0,
                f32::MAX,
            ),
            orb_lifetime_sec: clamp_field("orb_lifetime_sec", self.orb_lifetime_sec, d.orb_lifetime_sec, 0.01, f32::MAX),
            orb_jitter_deg: clamp_field("orb_jitter_deg", self.orb_jitter_deg, d.orb_jitter_deg, 0.0, 180.0),
            orb_pickup_pad_deg: clamp_field("orb_pickup_pad_deg", self.orb_pickup_pad_deg, d.orb_pickup_pad_deg, 0.0, 180.0),

            min_spawn_sep_from_player_deg: clamp_field(
                "min_spawn_sep_from_player_deg",
                self.min_spawn_sep_from_player_deg,
                d.min_spawn_sep_from_player_deg,
                0.0,
                180.0,
            ),

            force_fade_all_sec: clamp_field("force_fade_all_sec", self.force_fade_all_sec, d.force_fade_all_sec, 0.01, f32::MAX),
            fade_arcs_when_orb_picked: self.fade_arcs_when_orb_picked,
            fade_arcs_when_orb_timeout: self.fade_arcs_when_orb_timeout,

            travel_time_min_scale: clamp_field("travel_time_min_scale", self.travel_time_min_scale, d.travel_time_min_scale, 0.1, 1.0),
            telegraph_time_min_scale: clamp_field(
                "telegraph_time_min_scale",
                self.telegraph_time_min_scale,
                d.telegraph_time_min_scale,
                0.1,
                1.0,
            ),
            travel_difficulty_gamma: clamp_field(
                "travel_difficulty_gamma",
                self.travel_difficulty_gamma,
                d.travel_difficulty_gamma,
                0.2,
                2.0,
            ),
            spawn_interval_min_scale: clamp_field(
                "spawn_interval_min_scale",
                self.spawn_interval_min_scale,
                d.spawn_interval_min_scale,
                0.05,
                1.0,
            ),

            base_max_concurrent_arcs: base_max,
            max_max_concurrent_arcs: self.max_max_concurrent_arcs.max(1),
            arcs_max_gamma: clamp_field("arcs_max_gamma", self.arcs_max_gamma, d.arcs_max_gamma, 0.2, 2.0),

            countdown_duration: clamp_field("countdown_duration", self.countdown_duration, d.countdown_duration, 1.0, f32::MAX),
            flip_buffer_window: clamp_field("flip_buffer_window", self.flip_buffer_window, d.flip_buffer_window, 0.04, 0.25),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(r#"{ "orb_score": 25, "arc_hit_mode": "TravelAndStick" }"#).unwrap();
        assert_eq!(config.orb_score, 25);
        assert_eq!(config.arc_hit_mode, HitMode::TravelAndStick);
        assert_eq!(config.chain_max, 3.0);
        assert_eq!(config.stages.len(), 1);
    }

    #[test]
    fn test_stage_rows_get_sorted_and_filled() {
        let json = r#"{ "stages": [ { "start_sec": 30.0, "arc_size_deg": 40.0 }, { "start_sec": 0.0 } ] }"#;
        let config = Config::from_json_str(json).unwrap();
        assert_eq!(config.stages[0].start_sec, 0.0);
        assert_eq!(config.stages[1].start_sec, 30.0);
        assert_eq!(config.stages[1].arc_size_deg, 40.0);
        assert_eq!(config.stages[1].travel_time_sec, 0.38);
    }

    #[test]
    fn test_sanitize_clamps_bad_values() {
        let mut config = Config::default();
        config.track_radius = -2.0;
        config.chain_max = f32::NAN;
        config.collision_substeps = 40;
        config.stages[0].telegraph_time_sec = -1.0;
        config.stages[0].start_radius_scale = 0.5;
        config.stages[0].spawn_interval_min = 2.0;
        config.stages[0].spawn_interval_max = 1.0;

        let s = config.sanitized();
        assert!(s.track_radius > 0.0);
        assert_eq!(s.chain_max, 3.0);
        assert_eq!(s.collision_substeps, 8);
        assert_eq!(s.stages[0].telegraph_time_sec, 0.05);
        assert_eq!(s.stages[0].start_radius_scale, 1.25);
        assert_eq!(s.stages[0].spawn_interval_min, 1.0);
        assert_eq!(s.stages[0].spawn_interval_max, 2.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default();
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(Config::from_json_str("{ not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_hit_mode_names() {
        for mode in [
            HitMode::StickOnly,
            HitMode::TravelAndStick,
            HitMode::TelegraphTravelStick,
            HitMode::AllPhasesIncludingFade,
        ] {
            assert_eq!(HitMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(HitMode::from_str("nope"), None);
    }
}
