use rand::prelude::*;

use crate::Coord2;

/// Picks which of the candidate cells receive a mine.
pub trait MineGenerator {
    fn choose(&mut self, candidates: &[Coord2], mines: usize) -> Vec<Coord2>;
}

/// Uniformly random placement driven by a seedable generator, so a seed reproduces a layout.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn choose(&mut self, candidates: &[Coord2], mines: usize) -> Vec<Coord2> {
        candidates
            .choose_multiple(&mut self.rng, mines)
            .copied()
            .collect()
    }
}

/// Fixed layout, mostly useful to replay a known board.
///
/// Cells that are not candidates (out of bounds or inside the safe zone) are skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetMines(pub Vec<Coord2>);

impl MineGenerator for PresetMines {
    fn choose(&mut self, candidates: &[Coord2], mines: usize) -> Vec<Coord2> {
        let chosen: Vec<Coord2> = self
            .0
            .iter()
            .copied()
            .filter(|coords| candidates.contains(coords))
            .take(mines)
            .collect();
        if chosen.len() < self.0.len() {
            log::warn!(
                "preset layout trimmed from {} to {} mines",
                self.0.len(),
                chosen.len()
            );
        }
        chosen
    }
}
