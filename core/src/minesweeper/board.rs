use core::iter;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::MineGenerator;
use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    /// Mines in the 8-neighborhood, fixed once mines are placed.
    pub neighbor_mines: u8,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: CellCount,
    mines_placed: bool,
    revealed_count: CellCount,
    flagged_count: CellCount,
}

impl Board {
    /// Empty board; mines are laid later, around the first reveal.
    pub fn new(size: Coord2, mine_count: CellCount) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
            mine_count,
            mines_placed: false,
            revealed_count: 0,
            flagged_count: 0,
        }
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.cells)
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.size();
        if coords.0 < rows && coords.1 < cols {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_coords(self.size()).filter(|&coords| self.cell(coords).is_mine)
    }

    /// The 3×3 block centered on `center`, clipped to the board.
    pub fn safe_zone(&self, center: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        iter::once(center).chain(NeighborIter::new(center, self.size()))
    }

    /// Lays the mines uniformly at random outside the 3×3 block around `exclude`.
    pub fn place_mines<G: MineGenerator + ?Sized>(
        &mut self,
        exclude: Coord2,
        generator: &mut G,
    ) -> Result<()> {
        let exclude = self.validate_coords(exclude)?;
        if self.mines_placed {
            return Err(GameError::MinesAlreadyPlaced);
        }

        let safe: Vec<Coord2> = self.safe_zone(exclude).collect();
        let candidates: Vec<Coord2> = iter_coords(self.size())
            .filter(|coords| !safe.contains(coords))
            .collect();

        let wanted = usize::from(self.mine_count);
        if wanted > candidates.len() {
            log::warn!(
                "cannot place {} mines, only {} cells outside the safe zone",
                wanted,
                candidates.len()
            );
            return Err(GameError::TooManyMines);
        }

        let chosen = generator.choose(&candidates, wanted);
        if chosen.len() != wanted {
            log::warn!(
                "generated minefield count mismatch, actual: {}, requested: {}",
                chosen.len(),
                wanted
            );
        }
        self.lay_mines(&chosen)
    }

    /// Marks exactly `mines` as mined and computes every neighbor count.
    pub fn lay_mines(&mut self, mines: &[Coord2]) -> Result<()> {
        if self.mines_placed {
            return Err(GameError::MinesAlreadyPlaced);
        }
        for &coords in mines {
            self.validate_coords(coords)?;
        }

        for &coords in mines {
            self.cells[coords.to_nd_index()].is_mine = true;
        }
        self.mine_count = self.cells.iter().filter(|cell| cell.is_mine).count() as CellCount;

        for coords in iter_coords(self.size()) {
            if self.cell(coords).is_mine {
                continue;
            }
            let count = self
                .cells
                .iter_neighbors(coords)
                .filter(|&pos| self.cell(pos).is_mine)
                .count();
            self.cells[coords.to_nd_index()].neighbor_mines = count as u8;
        }

        self.mines_placed = true;
        log::debug!("placed {} mines on {:?}", self.mine_count, self.size());
        Ok(())
    }

    /// Reveals one cell, flooding out from it when it has no adjacent mines.
    ///
    /// Revealed and flagged cells are left alone.
    pub fn reveal_cell(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.to_nd_index()];

        if cell.is_revealed || cell.is_flagged {
            return Ok(RevealOutcome::NoChange);
        }

        cell.is_revealed = true;
        if cell.is_mine {
            log::debug!("mine revealed at {:?}", coords);
            return Ok(RevealOutcome::HitMine);
        }

        let count = cell.neighbor_mines;
        self.revealed_count += 1;
        log::debug!("revealed {:?}, mine count: {}", coords, count);

        if count == 0 {
            self.flood_fill(coords);
        }

        Ok(if self.is_cleared() {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        })
    }

    /// Opens the zero-count region connected to `origin` plus the numbered cells bordering it.
    fn flood_fill(&mut self, origin: Coord2) {
        let mut stack = vec![origin];
        log::trace!("starting flood-fill from {:?}", origin);

        while let Some(coords) = stack.pop() {
            for pos in self.cells.iter_neighbors(coords) {
                let cell = &mut self.cells[pos.to_nd_index()];
                if cell.is_revealed || cell.is_flagged || cell.is_mine {
                    continue;
                }

                cell.is_revealed = true;
                let count = cell.neighbor_mines;
                self.revealed_count += 1;
                log::trace!("flood opened {:?}, mine count: {}", pos, count);

                if count == 0 {
                    stack.push(pos);
                }
            }
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.to_nd_index()];

        Ok(match (cell.is_revealed, cell.is_flagged) {
            (true, _) => FlagOutcome::NoChange,
            (false, false) => {
                cell.is_flagged = true;
                self.flagged_count += 1;
                FlagOutcome::Flagged
            }
            (false, true) => {
                cell.is_flagged = false;
                self.flagged_count -= 1;
                FlagOutcome::Unflagged
            }
        })
    }

    /// Every non-mine cell is revealed.
    pub fn is_cleared(&self) -> bool {
        self.mines_placed && self.revealed_count == self.total_cells() - self.mine_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minesweeper::{PresetMines, RandomMineGenerator};
    use std::collections::{BTreeSet, VecDeque};

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        let mut board = Board::new(size, mines.len() as CellCount);
        board.lay_mines(mines).unwrap();
        board
    }

    fn revealed(board: &Board) -> BTreeSet<Coord2> {
        iter_coords(board.size())
            .filter(|&c| board.cell(c).is_revealed)
            .collect()
    }

    /// Zero-count region connected to `origin` plus its border, computed independently.
    fn expected_region(board: &Board, origin: Coord2) -> BTreeSet<Coord2> {
        let mut region = BTreeSet::from([origin]);
        let mut queue = VecDeque::from([origin]);
        while let Some(coords) = queue.pop_front() {
            if board.cell(coords).neighbor_mines != 0 {
                continue;
            }
            for pos in NeighborIter::new(coords, board.size()) {
                if !board.cell(pos).is_mine && region.insert(pos) {
                    queue.push_back(pos);
                }
            }
        }
        region
    }

    #[test]
    fn safe_zone_never_holds_a_mine() {
        for seed in 0..200 {
            for click in [(0, 0), (4, 3), (7, 6), (0, 6)] {
                let mut board = Board::new((8, 7), 10);
                board
                    .place_mines(click, &mut RandomMineGenerator::new(seed))
                    .unwrap();

                assert_eq!(board.mines().count(), 10);
                for coords in board.safe_zone(click) {
                    assert!(!board.cell(coords).is_mine, "seed {seed}, click {click:?}");
                }
            }
        }
    }

    #[test]
    fn neighbor_counts_match_adjacent_mines() {
        let mut board = Board::new((15, 15), 40);
        board
            .place_mines((7, 7), &mut RandomMineGenerator::new(3))
            .unwrap();

        for coords in iter_coords(board.size()) {
            if board.cell(coords).is_mine {
                continue;
            }
            let expected = NeighborIter::new(coords, board.size())
                .filter(|&pos| board.cell(pos).is_mine)
                .count();
            assert_eq!(usize::from(board.cell(coords).neighbor_mines), expected);
        }
    }

    #[test]
    fn too_many_mines_for_the_board() {
        let mut board = Board::new((3, 3), 1);

        let result = board.place_mines((1, 1), &mut RandomMineGenerator::new(0));

        assert_eq!(result, Err(GameError::TooManyMines));
        assert!(!board.mines_placed());
    }

    #[test]
    fn mines_are_placed_once() {
        let mut board = Board::new((5, 5), 2);
        board
            .place_mines((0, 0), &mut PresetMines(vec![(4, 4), (3, 4)]))
            .unwrap();

        assert_eq!(
            board.place_mines((0, 0), &mut RandomMineGenerator::new(1)),
            Err(GameError::MinesAlreadyPlaced)
        );
    }

    #[test]
    fn flood_fill_reveals_exactly_the_connected_region() {
        for seed in 0..50 {
            let mut board = Board::new((15, 15), 40);
            board
                .place_mines((7, 7), &mut RandomMineGenerator::new(seed))
                .unwrap();
            let expected = expected_region(&board, (7, 7));

            board.reveal_cell((7, 7)).unwrap();

            assert_eq!(revealed(&board), expected, "seed {seed}");
            assert!(board.mines().all(|c| !board.cell(c).is_revealed));
        }
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let mut board = board((4, 4), &[(3, 3)]);
        board.toggle_flag((0, 3)).unwrap();

        board.reveal_cell((0, 0)).unwrap();

        let cell = board.cell((0, 3));
        assert!(cell.is_flagged);
        assert!(!cell.is_revealed);
        assert!(!board.cell((3, 3)).is_revealed);
        assert!(!board.is_cleared());
    }

    #[test]
    fn numbered_cell_does_not_flood() {
        let mut board = board((3, 3), &[(0, 0)]);

        assert_eq!(board.reveal_cell((1, 1)), Ok(RevealOutcome::Revealed));
        assert_eq!(revealed(&board), BTreeSet::from([(1, 1)]));
    }

    #[test]
    fn revealing_the_last_safe_cell_wins() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.reveal_cell((0, 0)), Ok(RevealOutcome::Won));
        assert_eq!(board.cell((1, 1)).neighbor_mines, 1);
        assert!(board.is_cleared());
    }

    #[test]
    fn revealing_a_mine_is_reported() {
        let mut board = board((2, 2), &[(0, 0)]);

        assert_eq!(board.reveal_cell((0, 0)), Ok(RevealOutcome::HitMine));
        assert!(board.cell((0, 0)).is_revealed);
    }

    #[test]
    fn revealed_and_flagged_cells_are_left_alone() {
        let mut board = board((3, 3), &[(0, 0)]);
        board.reveal_cell((2, 2)).unwrap();
        board.toggle_flag((0, 0)).unwrap();
        let before = board.clone();

        assert_eq!(board.reveal_cell((2, 2)), Ok(RevealOutcome::NoChange));
        assert_eq!(board.reveal_cell((0, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(board, before);
    }

    #[test]
    fn flags_toggle_only_hidden_cells() {
        let mut board = board((3, 3), &[(0, 0)]);
        board.reveal_cell((1, 1)).unwrap();

        assert_eq!(board.toggle_flag((0, 0)), Ok(FlagOutcome::Flagged));
        assert_eq!(board.flagged_count(), 1);
        assert_eq!(board.toggle_flag((1, 1)), Ok(FlagOutcome::NoChange));
        assert_eq!(board.toggle_flag((0, 0)), Ok(FlagOutcome::Unflagged));
        assert_eq!(board.flagged_count(), 0);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut board = board((3, 3), &[(0, 0)]);

        assert_eq!(board.reveal_cell((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(board.toggle_flag((0, 9)), Err(GameError::InvalidCoords));
    }
}
