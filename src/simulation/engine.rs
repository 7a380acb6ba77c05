use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{ConfigError, FireConfig};
use crate::renderer::Renderer;
use crate::simulation::cell::Cell;
use crate::simulation::grid::GridCoordinate;
use crate::simulation::scheduler::SpreadScheduler;
use crate::simulation::store::FireCellStore;

/// Outcome of one spread pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpreadReport {
    /// Tick number this pass ran as
    pub tick: u64,
    /// Burning cells in the pre-pass snapshot
    pub sources: usize,
    /// Sources whose spread roll succeeded
    pub attempts: usize,
    /// Sources that rolled successfully but had no unburnt neighbor
    pub saturated: usize,
    /// Cells that actually caught fire
    pub ignited: usize,
}

/// Fire spread simulation: owns the burning cells and decides, once per
/// scheduled tick, which neighbors catch fire.
///
/// Each pass evaluates every burning cell against the state at the start of
/// the pass and commits the resulting ignitions afterward. A source ignites
/// at most one neighbor per tick, and fires started during a tick only spread
/// from the next tick on.
pub struct SpreadEngine<R = StdRng> {
    store: FireCellStore,
    scheduler: SpreadScheduler,
    rng: R,
    spread_chance: f64,
    tick: u64,
}

impl<R: Rng> SpreadEngine<R> {
    /// Validates `config` before allocating the grid.
    pub fn new(config: &FireConfig, rng: R, start: Instant) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: FireCellStore::new(GridCoordinate::from_config(config)),
            scheduler: SpreadScheduler::new(config.spread_interval, start),
            rng,
            spread_chance: config.spread_chance,
            tick: 0,
        })
    }

    pub fn store(&self) -> &FireCellStore {
        &self.store
    }

    pub fn grid(&self) -> &GridCoordinate {
        self.store.grid()
    }

    /// Number of spread passes run so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_burning(&self, cell: Cell) -> bool {
        self.store.contains(cell)
    }

    /// Run one spread pass if the scheduler allows it at `now`
    pub fn update(&mut self, now: Instant, renderer: &mut impl Renderer) -> Option<SpreadReport> {
        if !self.scheduler.try_tick(now) {
            return None;
        }
        let report = self.spread_once(renderer);
        log::debug!(
            "Spread tick {}: {} sources, {} ignited, {} saturated, {} burning",
            report.tick,
            report.sources,
            report.ignited,
            report.saturated,
            self.store.len()
        );
        Some(report)
    }

    /// Run one spread pass immediately, bypassing the scheduler
    pub fn spread_once(&mut self, renderer: &mut impl Renderer) -> SpreadReport {
        let tick = self.tick + 1;
        let mut report = SpreadReport {
            tick,
            ..SpreadReport::default()
        };

        // Evaluate against the pre-pass state; nothing is ignited until the
        // whole snapshot has been visited.
        let mut pending = Vec::new();
        for source in self.store.all_burning() {
            report.sources += 1;
            if !self.rng.gen_bool(self.spread_chance) {
                continue;
            }
            report.attempts += 1;

            let candidates = eligible_neighbors(&self.store, source);
            match candidates.choose(&mut self.rng) {
                Some(&target) => pending.push(target),
                None => {
                    report.saturated += 1;
                    log::debug!("Fire at {:?} has no unburnt neighbor", source);
                }
            }
        }

        self.tick = tick;
        for target in pending {
            // Two sources may pick the same target; only the first ignites it
            if self.store.ignite(target, tick) {
                report.ignited += 1;
                log::trace!("Fire spread to {:?}", target);
                renderer.on_ignite(target);
            }
        }

        report
    }

    /// In-bounds orthogonal neighbors of `cell` that are not burning
    pub fn valid_neighbors(&self, cell: Cell) -> Vec<Cell> {
        eligible_neighbors(&self.store, cell)
    }

    /// Set `cell` on fire. Returns false if it was already burning or off the grid.
    pub fn ignite(&mut self, cell: Cell, renderer: &mut impl Renderer) -> bool {
        if !self.store.ignite(cell, self.tick) {
            return false;
        }
        log::trace!("Ignited {:?}", cell);
        renderer.on_ignite(cell);
        true
    }

    /// Put out `cell` immediately. Returns false if it was not burning.
    pub fn extinguish(&mut self, cell: Cell, renderer: &mut impl Renderer) -> bool {
        if !self.store.extinguish(cell) {
            return false;
        }
        log::trace!("Extinguished {:?}", cell);
        renderer.on_extinguish(cell);
        true
    }

    /// Put out every fire and restart the spread interval at `now`.
    /// Returns how many fires were put out.
    pub fn restart(&mut self, now: Instant, renderer: &mut impl Renderer) -> usize {
        let burning: Vec<Cell> = self.store.all_burning().collect();
        for &cell in &burning {
            renderer.on_extinguish(cell);
        }
        self.store.clear();
        self.scheduler.reset(now);
        log::info!("Put out {} fires", burning.len());
        burning.len()
    }

    /// Ignite `count` distinct random unburnt cells (fewer if the grid fills up).
    /// Returns how many were ignited.
    pub fn seed_random(&mut self, count: usize, renderer: &mut impl Renderer) -> usize {
        let target = count.min(self.store.capacity() - self.store.len());
        let grid = *self.store.grid();
        let mut ignited = 0;
        while ignited < target {
            let cell = grid.random_cell(&mut self.rng);
            if self.ignite(cell, renderer) {
                ignited += 1;
            }
        }
        log::info!("Seeded {} fires ({} burning)", ignited, self.store.len());
        ignited
    }
}

fn eligible_neighbors(store: &FireCellStore, cell: Cell) -> Vec<Cell> {
    store
        .grid()
        .orthogonal_neighbors(cell)
        .filter(|neighbor| !store.contains(*neighbor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{RecordingRenderer, RenderEvent};
    use rand::SeedableRng;
    use std::time::Duration;

    fn engine(grid_cells: u32, spread_chance: f64, seed: u64) -> (SpreadEngine, Instant) {
        let config = FireConfig {
            grid_cells,
            spread_chance,
            ..FireConfig::default()
        };
        let start = Instant::now();
        let engine = SpreadEngine::new(&config, StdRng::seed_from_u64(seed), start).unwrap();
        (engine, start)
    }

    #[test]
    fn test_single_hop_per_tick() {
        let origin = Cell::new(5, 5);
        for seed in 0..50 {
            let (mut engine, _) = engine(50, 1.0, seed);
            let mut renderer = RecordingRenderer::default();
            engine.ignite(origin, &mut renderer);

            let report = engine.spread_once(&mut renderer);
            assert_eq!(report.ignited, 1);
            assert_eq!(engine.store().len(), 2);

            let spread: Vec<Cell> = engine.store().all_burning().filter(|c| *c != origin).collect();
            assert_eq!(spread.len(), 1);
            assert_eq!(origin.manhattan(spread[0]), 1);
            assert!(engine.store().all_burning().all(|c| origin.manhattan(c) < 2));
        }
    }

    #[test]
    fn test_new_fires_wait_for_next_tick() {
        let (mut engine, _) = engine(50, 1.0, 3);
        let mut renderer = RecordingRenderer::default();
        let sources = [Cell::new(10, 10), Cell::new(11, 10)];
        for cell in sources {
            engine.ignite(cell, &mut renderer);
        }

        let report = engine.spread_once(&mut renderer);
        assert_eq!(report.sources, 2);
        assert!(report.ignited <= 2);
        for cell in engine.store().all_burning() {
            assert!(sources.iter().any(|s| s.manhattan(cell) <= 1));
        }
        for cell in renderer.ignited().into_iter().skip(2) {
            assert_eq!(engine.store().ignition(cell).unwrap().tick, 1);
        }
    }

    #[test]
    fn test_corner_only_spreads_inward() {
        let corner = Cell::new(0, 0);
        for seed in 0..50 {
            let (mut engine, _) = engine(50, 1.0, seed);
            let mut renderer = RecordingRenderer::default();
            engine.ignite(corner, &mut renderer);
            engine.spread_once(&mut renderer);

            let spread: Vec<Cell> = engine.store().all_burning().filter(|c| *c != corner).collect();
            assert_eq!(spread.len(), 1);
            assert!(spread[0] == Cell::new(1, 0) || spread[0] == Cell::new(0, 1));
        }
    }

    #[test]
    fn test_saturated_neighborhood_halts_spread() {
        let (mut engine, _) = engine(50, 1.0, 11);
        let mut renderer = RecordingRenderer::default();
        let center = Cell::new(5, 5);
        engine.ignite(center, &mut renderer);
        let neighbors: Vec<Cell> = engine.grid().orthogonal_neighbors(center).collect();
        for neighbor in &neighbors {
            engine.ignite(*neighbor, &mut renderer);
        }
        assert!(engine.valid_neighbors(center).is_empty());
        renderer.events.clear();

        // Every source rolls; only the center has nowhere to go
        let report = engine.spread_once(&mut renderer);
        assert_eq!(report.sources, 5);
        assert_eq!(report.attempts, 5);
        assert_eq!(report.saturated, 1);
        assert!(report.ignited >= 1 && report.ignited <= 4);
        for cell in renderer.ignited() {
            assert_eq!(center.manhattan(cell), 2);
            assert!(neighbors.iter().any(|n| n.manhattan(cell) == 1));
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = FireConfig {
            spread_chance: 1.5,
            ..FireConfig::default()
        };
        let result = SpreadEngine::new(&config, StdRng::seed_from_u64(0), Instant::now());
        assert!(matches!(result, Err(ConfigError::SpreadChance(_))));
    }

    #[test]
    fn test_restart_puts_out_everything() {
        let (mut engine, start) = engine(50, 1.0, 21);
        let mut renderer = RecordingRenderer::default();
        engine.seed_random(6, &mut renderer);
        let burning: Vec<Cell> = engine.store().all_burning().collect();
        renderer.events.clear();

        let now = start + Duration::from_millis(400);
        assert_eq!(engine.restart(now, &mut renderer), 6);
        assert!(engine.store().is_empty());
        let expected: Vec<RenderEvent> = burning.into_iter().map(RenderEvent::Extinguish).collect();
        assert_eq!(renderer.events, expected);

        // The interval restarts from the restart, not from the engine start
        let interval = engine.scheduler.interval();
        assert!(engine.update(start + interval, &mut renderer).is_none());
        assert!(engine.update(now + interval, &mut renderer).is_some());
    }

    #[test]
    fn test_fully_burning_grid_is_terminal() {
        let (mut engine, _) = engine(3, 1.0, 5);
        let mut renderer = RecordingRenderer::default();
        assert_eq!(engine.seed_random(9, &mut renderer), 9);
        renderer.events.clear();

        let report = engine.spread_once(&mut renderer);
        assert_eq!(report.sources, 9);
        assert_eq!(report.attempts, 9);
        assert_eq!(report.saturated, 9);
        assert_eq!(report.ignited, 0);
        assert!(renderer.events.is_empty());
    }

    #[test]
    fn test_shared_target_ignites_once() {
        // Everything but the center burns: the four edge cells all pick the
        // center, the corners have nowhere to go
        let (mut engine, _) = engine(3, 1.0, 8);
        let mut renderer = RecordingRenderer::default();
        let center = Cell::new(1, 1);
        for row in 0..3 {
            for col in 0..3 {
                if Cell::new(col, row) != center {
                    engine.ignite(Cell::new(col, row), &mut renderer);
                }
            }
        }
        renderer.events.clear();

        let report = engine.spread_once(&mut renderer);
        assert_eq!(report.attempts, 8);
        assert_eq!(report.saturated, 4);
        assert_eq!(report.ignited, 1);
        assert_eq!(renderer.events, vec![RenderEvent::Ignite(center)]);
    }

    #[test]
    fn test_zero_chance_never_spreads() {
        let (mut engine, _) = engine(50, 0.0, 2);
        let mut renderer = RecordingRenderer::default();
        engine.seed_random(20, &mut renderer);
        for _ in 0..10 {
            let report = engine.spread_once(&mut renderer);
            assert_eq!(report.attempts, 0);
        }
        assert_eq!(engine.store().len(), 20);
    }

    #[test]
    fn test_update_is_gated_by_scheduler() {
        let (mut engine, start) = engine(50, 1.0, 4);
        let mut renderer = RecordingRenderer::default();
        engine.ignite(Cell::new(20, 20), &mut renderer);

        let interval = FireConfig::default().spread_interval;
        assert_eq!(engine.update(start, &mut renderer), None);
        assert_eq!(engine.update(start + interval / 2, &mut renderer), None);
        assert_eq!(engine.store().len(), 1);

        let report = engine.update(start + interval, &mut renderer).unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.store().len(), 2);
    }

    #[test]
    fn test_extinguish_emits_once() {
        let (mut engine, _) = engine(50, 0.2, 6);
        let mut renderer = RecordingRenderer::default();
        let cell = Cell::new(4, 4);
        assert!(engine.ignite(cell, &mut renderer));
        assert!(!engine.ignite(cell, &mut renderer));
        assert!(engine.extinguish(cell, &mut renderer));
        assert!(!engine.extinguish(cell, &mut renderer));
        assert_eq!(
            renderer.events,
            vec![RenderEvent::Ignite(cell), RenderEvent::Extinguish(cell)]
        );
        assert!(!engine.is_burning(cell));
    }

    #[test]
    fn test_seed_random_is_capped() {
        let (mut engine, _) = engine(2, 0.2, 9);
        let mut renderer = RecordingRenderer::default();
        assert_eq!(engine.seed_random(10, &mut renderer), 4);
        assert_eq!(engine.store().len(), 4);
        assert_eq!(engine.seed_random(1, &mut renderer), 0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = |seed| {
            let (mut engine, _) = engine(50, 0.2, seed);
            let mut renderer = RecordingRenderer::default();
            engine.seed_random(10, &mut renderer);
            for _ in 0..5 {
                engine.spread_once(&mut renderer);
            }
            engine.store().all_burning().collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_scenario_spread_is_monotonic() {
        let (mut engine, start) = engine(50, 0.2, 2024);
        let mut renderer = RecordingRenderer::default();
        assert_eq!(engine.seed_random(25, &mut renderer), 25);
        assert_eq!(engine.store().len(), 25);

        let interval = engine.scheduler.interval();
        let mut previous = engine.store().len();
        for step in 1..=10u32 {
            let now = start + interval * step + Duration::from_millis(1);
            let report = engine.update(now, &mut renderer).unwrap();
            assert!(report.ignited <= report.sources);

            let burning = engine.store().len();
            assert!(burning >= previous, "burning count dropped at tick {}", step);
            assert!(burning <= 2500);
            assert_eq!(burning, previous + report.ignited);
            previous = burning;
        }
        assert_eq!(engine.tick(), 10);
    }
}
