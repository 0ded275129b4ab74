//! Initial placement of newly created cards.
//!
//! New cards go onto a grid, one cell per card placed so far, with random
//! jitter so that cards created in quick succession do not stack exactly.
//! The caller keeps the count; removing a card does not hand its cell out
//! again.

use rand::{Rng, SeedableRng, rngs::StdRng};

use trellis_core::geometry::Point;

use crate::config::PlacementConfig;

/// Hands out jittered grid positions for new cards.
#[derive(Debug, Clone)]
pub struct Placement {
    config: PlacementConfig,
    rng: StdRng,
}

impl Placement {
    /// Creates a placement seeded from the operating system.
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a placement with a fixed seed, for reproducible layouts.
    pub fn seeded(config: PlacementConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns the position of grid cell `cell`, with jitter applied.
    pub fn next_position(&mut self, cell: usize) -> Point {
        let columns = self.config.columns();
        let cell_size = self.config.cell_size();
        let row = cell / columns;
        let col = cell % columns;

        let base = Point::new(
            col as f32 * cell_size.width(),
            row as f32 * cell_size.height(),
        );

        let jitter = self.config.jitter();
        if jitter == 0.0 {
            return base;
        }
        let offset = Point::new(
            self.rng.random_range(-jitter..=jitter),
            self.rng.random_range(-jitter..=jitter),
        );
        base.add_point(offset)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}
