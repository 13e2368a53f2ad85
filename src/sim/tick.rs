//! Session controller and the fixed timestep tick
//!
//! [`Session`] owns every piece of game state and advances it one fixed step at
//! a time. Input is captured between ticks and only read at the start of the
//! next one, so two sessions with the same seed and inputs stay identical.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{self, GrazeTracker, SweepConfig};
use super::difficulty::DifficultyCurve;
use super::gap;
use super::obstacle::Phase;
use super::scheduler::ObstacleScheduler;
use super::state::{FlipBuffer, GameEvent, GamePhase, Pickup, Player};
use crate::consts::GAP_INFLATE_DEG;
use crate::delta_angle;
use crate::highscores::BestScoreStore;
use crate::settings::Config;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flip presses since the last tick
    pub flips: u8,
    /// Start from the title screen, or retry after game over
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Abandon the run and go back to the title screen
    pub to_title: bool,
}

/// Renderer-facing view of one obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub center: f32,
    pub half_width: f32,
    pub phase: Phase,
    pub radius: f32,
    pub alpha: f32,
    pub dangerous: bool,
}

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: GamePhase,
    pub time_ticks: u64,
    pub score: u64,
    pub best_score: u64,
    pub multiplier: f32,
    pub rank: Option<u64>,
    pub retry_count: u32,
    pub countdown_display: u32,
    pub player_angle: f32,
    pub player_dir: i8,
    pub player_speed_deg: f32,
    pub pickup_angle: Option<f32>,
    pub pickup_remaining: f32,
    pub obstacles: Vec<ObstacleView>,
}

/// One play session: title screen, runs, retries
pub struct Session {
    config: Config,
    rng: Pcg32,
    store: Box<dyn BestScoreStore>,

    state: GamePhase,
    time_ticks: u64,

    player: Player,
    scheduler: ObstacleScheduler,
    pickup: Pickup,
    flip_buffer: FlipBuffer,
    graze: GrazeTracker,

    score: u64,
    best_score: u64,
    multiplier: f32,
    chain_timer: f32,
    retry_count: u32,
    countdown: f32,
    countdown_display: u32,
    rank: Option<u64>,

    events: Vec<GameEvent>,
}

impl Session {
    /// Create a session on the title screen.
    ///
    /// The best score is read from `store` once here; a failed read is logged
    /// and treated as 0.
    pub fn new(config: Config, seed: u64, store: Box<dyn BestScoreStore>) -> Self {
        let config = config.sanitized();
        let best_score = store.load_best().unwrap_or_else(|e| {
            log::warn!("Could not read best score: {}", e);
            0
        });
        log::info!("Session created (seed {}, best {})", seed, best_score);

        Self {
            pickup: Pickup::new(config.orb_lifetime_sec),
            config,
            rng: Pcg32::seed_from_u64(seed),
            store,
            state: GamePhase::Title,
            time_ticks: 0,
            player: Player::default(),
            scheduler: ObstacleScheduler::new(),
            flip_buffer: FlipBuffer::default(),
            graze: GrazeTracker::default(),
            score: 0,
            best_score,
            multiplier: 1.0,
            chain_timer: 0.0,
            retry_count: 0,
            countdown: 0.0,
            countdown_display: 0,
            rank: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> GamePhase {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn scheduler(&self) -> &ObstacleScheduler {
        &self.scheduler
    }

    pub fn pickup(&self) -> &Pickup {
        &self.pickup
    }

    pub fn rank(&self) -> Option<u64> {
        self.rank
    }

    /// Leaderboard rank reported by an external service
    pub fn set_leaderboard_rank(&mut self, rank: Option<u64>) {
        if rank != self.rank {
            log::info!("Leaderboard rank: {:?}", rank);
        }
        self.rank = rank;
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffer a direction flip for the next tick. Ignored unless playing.
    pub fn queue_flip(&mut self) {
        if self.state == GamePhase::Playing {
            self.flip_buffer.queue(self.config.flip_buffer_window);
        }
    }

    /// Advance the session by `dt` seconds
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for _ in 0..input.flips {
            self.queue_flip();
        }

        if input.to_title && matches!(self.state, GamePhase::Paused | GamePhase::GameOver) {
            self.restart_to_title();
            return;
        }

        if input.pause {
            match self.state {
                GamePhase::Playing => {
                    self.set_state(GamePhase::Paused);
                    return;
                }
                GamePhase::Paused => self.set_state(GamePhase::Playing),
                _ => {}
            }
        }

        if input.start && matches!(self.state, GamePhase::Title | GamePhase::GameOver) {
            self.start_game();
            return;
        }

        match self.state {
            GamePhase::Countdown => self.tick_countdown(dt),
            GamePhase::Playing => self.tick_playing(dt),
            GamePhase::Title | GamePhase::Paused | GamePhase::GameOver => return,
        }
        self.time_ticks += 1;
    }

    /// Reset the run and enter the countdown
    pub fn start_game(&mut self) {
        if self.state == GamePhase::GameOver {
            self.retry_count += 1;
            self.emit(GameEvent::RetryStarted {
                retry_count: self.retry_count,
            });
        }

        self.reset_run();
        self.apply_speed();

        self.countdown = self.config.countdown_duration.max(1.0);
        self.countdown_display = self.countdown.ceil() as u32;
        self.set_state(GamePhase::Countdown);
        self.emit(GameEvent::CountdownTick {
            display: self.countdown_display,
        });
    }

    /// Drop the current run and go back to the title screen
    pub fn restart_to_title(&mut self) {
        self.reset_run();
        self.set_state(GamePhase::Title);
    }

    fn reset_run(&mut self) {
        if self.score != 0 {
            self.score = 0;
            self.emit(GameEvent::ScoreChanged { score: 0 });
        }
        self.multiplier = 1.0;
        self.chain_timer = 0.0;
        self.graze.reset();
        self.flip_buffer.clear();
        self.player.reset(0.0);
        self.scheduler.reset();
        self.pickup.reset();
    }

    fn tick_countdown(&mut self, dt: f32) {
        self.countdown -= dt;
        if self.countdown <= 0.0 {
            self.countdown = 0.0;
            self.countdown_display = 0;
            self.set_state(GamePhase::Playing);
            self.try_spawn_orb();
            return;
        }

        let display = self.countdown.ceil() as u32;
        if display != self.countdown_display {
            self.countdown_display = display;
            self.emit(GameEvent::CountdownTick { display });
        }
    }

    fn tick_playing(&mut self, dt: f32) {
        let score_before = self.score;

        if self.flip_buffer.drain(dt) {
            self.player.flip();
            self.emit(GameEvent::Flipped { dir: self.player.dir });
        }

        let prev_angle = self.player.angle;
        self.player.tick(dt);

        let curve = DifficultyCurve::new(&self.config);
        self.scheduler.difficulty_t = curve.difficulty_t(self.score);
        self.scheduler
            .tick(dt, self.player.angle, &self.config, &mut self.rng);

        self.pickup.tick(dt);
        if self.pickup.consume_just_timed_out() {
            log::debug!("Orb expired at {:.1}°", self.pickup.angle.to_degrees());
            self.emit(GameEvent::PickupExpired);
            if self.config.fade_arcs_when_orb_timeout {
                self.fade_all_arcs();
            }
            self.try_spawn_orb();
        }

        let sweep = collision::sweep(
            prev_angle,
            self.player.angle,
            dt,
            self.scheduler.obstacles(),
            &SweepConfig::from(&self.config),
        );
        if sweep.hit {
            self.on_hazard_hit();
            return;
        }

        self.score += self.graze.update(
            dt,
            self.player.angle,
            self.scheduler.obstacles(),
            self.config.graze_threshold_deg,
        );

        if self.orb_in_reach() {
            self.collect_orb();
        } else {
            self.chain_timer += dt;
            if self.chain_timer >= self.config.chain_reset_if_no_pickup_sec {
                if self.multiplier > 1.0 {
                    log::debug!("Chain broken at x{:.1}", self.multiplier);
                }
                self.multiplier = 1.0;
                self.chain_timer = 0.0;
            }
        }

        if !self.pickup.alive {
            self.try_spawn_orb();
        }

        self.apply_speed();
        if self.score != score_before {
            self.emit(GameEvent::ScoreChanged { score: self.score });
        }
    }

    fn orb_in_reach(&self) -> bool {
        self.pickup.alive
            && delta_angle(self.player.angle, self.pickup.angle).abs()
                <= self.config.orb_pickup_pad_deg.to_radians()
    }

    fn collect_orb(&mut self) {
        let points = (self.config.orb_score as f32 * self.multiplier).round() as u64;
        self.score += points;
        self.multiplier = (self.multiplier + self.config.chain_step).min(self.config.chain_max);
        self.chain_timer = 0.0;
        log::debug!(
            "Orb collected: +{} (score {}, next x{:.1})",
            points,
            self.score,
            self.multiplier
        );

        if self.config.fade_arcs_when_orb_picked {
            self.fade_all_arcs();
        }
        self.pickup.kill();
        self.emit(GameEvent::PickupCollected {
            score: self.score,
            multiplier: self.multiplier,
        });
        self.try_spawn_orb();
    }

    fn on_hazard_hit(&mut self) {
        self.set_state(GamePhase::GameOver);

        let new_best = self.score > self.best_score;
        if new_best {
            self.best_score = self.score;
            log::info!("New best score: {}", self.best_score);
            if let Err(e) = self.store.save_best(self.best_score) {
                log::warn!("Could not save best score: {}", e);
            }
        }
        self.emit(GameEvent::HazardHit {
            score: self.score,
            best: self.best_score,
            new_best,
        });
    }

    fn fade_all_arcs(&mut self) {
        let count = self.scheduler.force_fade_all(self.config.force_fade_all_sec);
        if count > 0 {
            log::debug!("Faded {} arcs", count);
            self.emit(GameEvent::ArcsFaded { count });
        }
    }

    /// Place the orb in the widest gap between arcs
    fn try_spawn_orb(&mut self) {
        let target = gap::orb_target_angle(
            self.scheduler.obstacles().iter().map(|o| &o.arc),
            self.player.angle,
            GAP_INFLATE_DEG.to_radians(),
            self.config.min_spawn_sep_from_player_deg.to_radians(),
        );
        let angle = gap::jitter_angle(target, self.config.orb_jitter_deg.to_radians(), &mut self.rng);
        self.pickup.spawn_at(angle);
        self.emit(GameEvent::PickupSpawned {
            angle: self.pickup.angle,
        });
    }

    fn apply_speed(&mut self) {
        let speed = DifficultyCurve::new(&self.config).player_speed_deg(self.score);
        if (speed - self.player.angular_speed_deg).abs() > f32::EPSILON {
            self.player.set_angular_speed(speed);
            self.emit(GameEvent::DifficultyChanged {
                speed_deg_per_sec: self.player.angular_speed_deg,
            });
        }
    }

    fn set_state(&mut self, to: GamePhase) {
        let from = self.state;
        if from == to {
            return;
        }
        log::info!("State: {:?} -> {:?}", from, to);
        self.state = to;
        self.emit(GameEvent::StateChanged { from, to });
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let track_radius = self.config.track_radius;
        let mode = self.config.arc_hit_mode;
        SessionSnapshot {
            state: self.state,
            time_ticks: self.time_ticks,
            score: self.score,
            best_score: self.best_score,
            multiplier: self.multiplier,
            rank: self.rank,
            retry_count: self.retry_count,
            countdown_display: self.countdown_display,
            player_angle: self.player.angle,
            player_dir: self.player.dir,
            player_speed_deg: self.player.angular_speed_deg,
            pickup_angle: self.pickup.alive.then_some(self.pickup.angle),
            pickup_remaining: self.pickup.remaining_fraction(),
            obstacles: self
                .scheduler
                .obstacles()
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    center: o.arc.center,
                    half_width: o.arc.half_width,
                    phase: o.phase,
                    radius: o.radius(track_radius),
                    alpha: o.alpha(),
                    dangerous: o.is_dangerous(mode),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::error::StoreError;
    use crate::highscores::MemoryStore;
    use crate::sim::arc::ArcSpan;
    use crate::sim::obstacle::{Obstacle, PhaseTimings};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Store whose contents the test can still read after handing it over
    struct SharedStore(Rc<Cell<u64>>);

    impl BestScoreStore for SharedStore {
        fn load_best(&self) -> Result<u64, StoreError> {
            Ok(self.0.get())
        }

        fn save_best(&mut self, score: u64) -> Result<(), StoreError> {
            self.0.set(score);
            Ok(())
        }
    }

    /// No scheduled arcs and a stationary player
    fn quiet_config() -> Config {
        Config {
            stages: Vec::new(),
            player_min_speed_deg_per_sec: 0.0,
            player_max_speed_deg_per_sec: 0.0,
            ..Config::default()
        }
    }

    fn session(config: Config) -> Session {
        Session::new(config, 42, Box::new(MemoryStore::new()))
    }

    fn press(start: bool, pause: bool, to_title: bool) -> TickInput {
        TickInput {
            flips: 0,
            start,
            pause,
            to_title,
        }
    }

    /// Start a run and skip the countdown
    fn start_playing(s: &mut Session) {
        s.tick(&press(true, false, false), SIM_DT);
        s.tick(&TickInput::default(), 10.0);
        assert_eq!(s.state(), GamePhase::Playing);
        s.drain_events();
    }

    fn stuck_arc(id: u32, center_deg: f32, half_deg: f32) -> Obstacle {
        let timings = PhaseTimings {
            telegraph: 0.1,
            travel: 0.1,
            stick: 10.0,
            fade: 0.1,
        };
        let mut o = Obstacle::new(
            id,
            ArcSpan::new(center_deg.to_radians(), half_deg.to_radians()),
            timings,
            2.0,
            1.35,
        );
        o.tick(0.2);
        o.tick(0.2);
        o
    }

    #[test]
    fn test_title_to_countdown_to_playing() {
        let mut s = session(Config::default());
        assert_eq!(s.state(), GamePhase::Title);

        s.tick(&TickInput::default(), SIM_DT);
        assert_eq!(s.state(), GamePhase::Title);

        s.tick(&press(true, false, false), SIM_DT);
        assert_eq!(s.state(), GamePhase::Countdown);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::CountdownTick { display: 3 }));

        s.tick(&TickInput::default(), 0.5);
        s.tick(&TickInput::default(), 0.5);
        assert!(s.drain_events().contains(&GameEvent::CountdownTick { display: 2 }));

        for _ in 0..4 {
            s.tick(&TickInput::default(), 0.5);
        }
        assert_eq!(s.state(), GamePhase::Playing);
        assert!(s.pickup().alive);
        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::PickupSpawned { .. })));
        assert!(events.contains(&GameEvent::StateChanged {
            from: GamePhase::Countdown,
            to: GamePhase::Playing,
        }));
    }

    #[test]
    fn test_short_countdown_is_at_least_one_second() {
        let config = Config {
            countdown_duration: 0.0,
            ..Config::default()
        };
        let mut s = session(config);
        s.tick(&press(true, false, false), SIM_DT);
        s.tick(&TickInput::default(), 0.9);
        assert_eq!(s.state(), GamePhase::Countdown);
        s.tick(&TickInput::default(), 0.2);
        assert_eq!(s.state(), GamePhase::Playing);
    }

    #[test]
    fn test_tick_pause() {
        let mut s = session(Config::default());
        start_playing(&mut s);

        s.tick(&press(false, true, false), SIM_DT);
        assert_eq!(s.state(), GamePhase::Paused);

        let angle = s.player().angle;
        let ticks = s.time_ticks();
        for _ in 0..10 {
            s.tick(&TickInput::default(), SIM_DT);
        }
        assert_eq!(s.player().angle, angle);
        assert_eq!(s.time_ticks(), ticks);

        s.tick(&press(false, true, false), SIM_DT);
        assert_eq!(s.state(), GamePhase::Playing);
    }

    #[test]
    fn test_flips_ignored_outside_playing() {
        let mut s = session(Config::default());
        s.queue_flip();
        assert_eq!(s.flip_buffer.pending, 0);
        s.tick(&press(true, false, false), SIM_DT);
        s.queue_flip();
        assert_eq!(s.flip_buffer.pending, 0);
    }

    #[test]
    fn test_flip_applied_on_next_tick() {
        let mut s = session(Config::default());
        start_playing(&mut s);
        assert_eq!(s.player().dir, 1);

        let flip = TickInput {
            flips: 1,
            ..Default::default()
        };
        s.tick(&flip, SIM_DT);
        assert_eq!(s.player().dir, -1);
        assert!(s.drain_events().contains(&GameEvent::Flipped { dir: -1 }));

        // Two buffered presses land on consecutive ticks
        s.queue_flip();
        s.queue_flip();
        s.tick(&TickInput::default(), SIM_DT);
        assert_eq!(s.player().dir, 1);
        s.tick(&TickInput::default(), SIM_DT);
        assert_eq!(s.player().dir, -1);
    }

    #[test]
    fn test_three_pickups_chain_to_36_points() {
        let mut s = session(quiet_config());
        start_playing(&mut s);

        for _ in 0..3 {
            let angle = s.player.angle;
            s.pickup.spawn_at(angle);
            s.tick(&TickInput::default(), SIM_DT);
        }
        assert_eq!(s.score(), 36);
        assert!((s.multiplier() - 1.6).abs() < 1e-4);

        let collected: Vec<u64> = s
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::PickupCollected { score, .. } => Some(score),
                _ => None,
            })
            .collect();
        assert_eq!(collected, vec![10, 22, 36]);
    }

    #[test]
    fn test_multiplier_caps_at_chain_max() {
        let mut s = session(quiet_config());
        start_playing(&mut s);
        for _ in 0..20 {
            let angle = s.player.angle;
            s.pickup.spawn_at(angle);
            s.tick(&TickInput::default(), SIM_DT);
            assert!(s.multiplier() >= 1.0 && s.multiplier() <= 3.0);
        }
        assert!((s.multiplier() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_multiplier_resets_after_drought() {
        let mut s = session(quiet_config());
        start_playing(&mut s);
        let angle = s.player.angle;
        s.pickup.spawn_at(angle);
        s.tick(&TickInput::default(), SIM_DT);
        assert!((s.multiplier() - 1.2).abs() < 1e-6);

        // Keep the orb out of reach for just under the reset window
        for _ in 0..49 {
            s.pickup.kill();
            s.tick(&TickInput::default(), 0.1);
        }
        assert!((s.multiplier() - 1.2).abs() < 1e-6);

        s.pickup.kill();
        s.tick(&TickInput::default(), 0.2);
        assert_eq!(s.multiplier(), 1.0);
        assert_eq!(s.chain_timer, 0.0);
    }

    #[test]
    fn test_hazard_hit_ends_run_and_saves_best() {
        let best = Rc::new(Cell::new(5));
        let mut s = Session::new(quiet_config(), 1, Box::new(SharedStore(best.clone())));
        assert_eq!(s.best_score(), 5);
        start_playing(&mut s);

        s.score = 20;
        s.scheduler.push(stuck_arc(99, 0.0, 5.0));
        s.tick(&TickInput::default(), SIM_DT);

        assert_eq!(s.state(), GamePhase::GameOver);
        assert_eq!(s.best_score(), 20);
        assert_eq!(best.get(), 20);
        assert!(s.drain_events().contains(&GameEvent::HazardHit {
            score: 20,
            best: 20,
            new_best: true,
        }));

        // Frozen after game over
        let ticks = s.time_ticks();
        s.tick(&TickInput::default(), SIM_DT);
        assert_eq!(s.time_ticks(), ticks);
    }

    #[test]
    fn test_lower_score_keeps_best() {
        let best = Rc::new(Cell::new(50));
        let mut s = Session::new(quiet_config(), 1, Box::new(SharedStore(best.clone())));
        start_playing(&mut s);
        s.score = 12;
        s.scheduler.push(stuck_arc(1, 0.0, 5.0));
        s.tick(&TickInput::default(), SIM_DT);

        assert_eq!(s.best_score(), 50);
        assert_eq!(best.get(), 50);
        assert!(s.drain_events().contains(&GameEvent::HazardHit {
            score: 12,
            best: 50,
            new_best: false,
        }));
    }

    #[test]
    fn test_retry_and_back_to_title() {
        let mut s = session(quiet_config());
        start_playing(&mut s);
        s.score = 7;
        s.scheduler.push(stuck_arc(1, 0.0, 5.0));
        s.tick(&TickInput::default(), SIM_DT);
        assert_eq!(s.state(), GamePhase::GameOver);
        s.drain_events();

        s.tick(&press(true, false, false), SIM_DT);
        assert_eq!(s.state(), GamePhase::Countdown);
        assert_eq!(s.retry_count(), 1);
        assert_eq!(s.score(), 0);
        assert_eq!(s.scheduler().active_count(), 0);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::RetryStarted { retry_count: 1 }));
        assert!(events.contains(&GameEvent::ScoreChanged { score: 0 }));

        s.tick(&TickInput::default(), 10.0);
        s.scheduler.push(stuck_arc(2, 0.0, 5.0));
        s.tick(&TickInput::default(), SIM_DT);
        assert_eq!(s.state(), GamePhase::GameOver);

        s.tick(&press(false, false, true), SIM_DT);
        assert_eq!(s.state(), GamePhase::Title);
        assert_eq!(s.retry_count(), 1);
    }

    #[test]
    fn test_orb_timeout_fades_arcs() {
        let mut s = session(quiet_config());
        start_playing(&mut s);
        s.scheduler.push(stuck_arc(3, 180.0, 10.0));

        s.pickup.spawn_at(90f32.to_radians());
        s.pickup.timer = s.pickup.lifetime - 0.001;
        s.tick(&TickInput::default(), SIM_DT);

        assert_eq!(s.state(), GamePhase::Playing);
        assert!(s.pickup().alive, "orb respawns after expiring");
        assert_eq!(s.scheduler().obstacles()[0].phase, Phase::Fading);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::PickupExpired));
        assert!(events.contains(&GameEvent::ArcsFaded { count: 1 }));
    }

    #[test]
    fn test_orb_spawns_away_from_arcs() {
        let mut s = session(quiet_config());
        start_playing(&mut s);
        s.scheduler.push(stuck_arc(1, 90.0, 30.0));
        s.scheduler.push(stuck_arc(2, 270.0, 30.0));
        s.pickup.kill();
        s.tick(&TickInput::default(), SIM_DT);

        let orb = s.pickup().angle;
        for o in s.scheduler().obstacles() {
            assert!(!o.arc.contains_angle(orb));
        }
    }

    #[test]
    fn test_speed_follows_score() {
        let mut s = session(Config::default());
        start_playing(&mut s);
        assert!((s.player().angular_speed_deg - 110.0).abs() < 1e-3);

        s.score = 220;
        s.tick(&TickInput::default(), SIM_DT);
        if s.state() == GamePhase::Playing {
            assert!((s.player().angular_speed_deg - 300.0).abs() < 1e-3);
            assert!(s.drain_events().iter().any(|e| matches!(
                e,
                GameEvent::DifficultyChanged { speed_deg_per_sec } if (*speed_deg_per_sec - 300.0).abs() < 1e-3
            )));
        }
    }

    #[test]
    fn test_rank_and_snapshot() {
        let mut s = session(Config::default());
        start_playing(&mut s);
        for _ in 0..120 {
            s.tick(&TickInput::default(), SIM_DT);
        }
        s.set_leaderboard_rank(Some(4));
        assert_eq!(s.rank(), Some(4));

        let snap = s.snapshot();
        assert_eq!(snap.rank, Some(4));
        assert_eq!(snap.score, s.score());
        assert_eq!(snap.obstacles.len(), s.scheduler().active_count());
        let json = serde_json::to_string(&snap).unwrap();
        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state, snap.state);
    }

    #[test]
    fn test_determinism() {
        let mut a = session(Config::default());
        let mut b = session(Config::default());

        for i in 0..1200u32 {
            let input = TickInput {
                flips: u8::from(i % 97 == 0),
                start: i == 0,
                ..Default::default()
            };
            a.tick(&input, SIM_DT);
            b.tick(&input, SIM_DT);
        }

        assert_eq!(a.time_ticks(), b.time_ticks());
        assert_eq!(a.drain_events(), b.drain_events());
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
