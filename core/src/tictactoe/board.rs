use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Mark {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Self::X),
            "o" | "O" => Ok(Self::O),
            _ => Err(format!("Please type X or O (got {s:?})")),
        }
    }
}

/// `(row, col)` on the 3×3 grid.
pub type Position = (u8, u8);

/// Every row, column, and diagonal.
pub const LINES: [[Position; 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

pub const CENTER: Position = (1, 1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Evaluation {
    Winner(Mark),
    Draw,
    Ongoing,
}

impl Evaluation {
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Mark>; 3]; 3],
}

impl Board {
    pub const EMPTY: Board = Board {
        cells: [[None; 3]; 3],
    };

    /// The mark at `pos`; `None` for empty or off-board cells.
    pub fn get(&self, (row, col): Position) -> Option<Mark> {
        self.cells
            .get(usize::from(row))?
            .get(usize::from(col))
            .copied()
            .flatten()
    }

    /// Puts `mark` on an empty in-range cell.
    pub fn place(&mut self, pos: Position, mark: Mark) -> Result<()> {
        if pos.0 > 2 || pos.1 > 2 {
            return Err(GameError::InvalidCoords);
        }
        if self.get(pos).is_some() {
            return Err(GameError::Occupied);
        }
        self.set(pos, Some(mark));
        Ok(())
    }

    pub(crate) fn set(&mut self, (row, col): Position, mark: Option<Mark>) {
        self.cells[usize::from(row)][usize::from(col)] = mark;
    }

    /// Empty cells in row-major order.
    pub fn available_moves(&self) -> impl Iterator<Item = Position> + use<> {
        let board = *self;
        (0..3u8)
            .flat_map(|row| (0..3u8).map(move |col| (row, col)))
            .filter(move |&pos| board.get(pos).is_none())
    }

    pub fn move_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.move_count() == 9
    }
}

/// Checks rows, columns, and diagonals for a winner, then a full board for a draw.
pub fn evaluate(board: &Board) -> Evaluation {
    for line in LINES {
        let [a, b, c] = line.map(|pos| board.get(pos));
        if let Some(mark) = a {
            if b == a && c == a {
                return Evaluation::Winner(mark);
            }
        }
    }
    if board.is_full() {
        Evaluation::Draw
    } else {
        Evaluation::Ongoing
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.map_or('.', Mark::symbol))?;
            }
        }
        Ok(())
    }
}

/// Parses nine cells of `X`, `O`, or `.`, ignoring whitespace.
impl FromStr for Board {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let cells: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if cells.len() != 9 {
            return Err(GameError::InvalidCoords);
        }
        let mut board = Board::EMPTY;
        for (i, c) in cells.into_iter().enumerate() {
            let mark = match c.to_ascii_uppercase() {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                '.' | '-' => None,
                _ => return Err(GameError::InvalidCoords),
            };
            board.set(((i / 3) as u8, (i % 3) as u8), mark);
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    /// Every position reachable by alternating play from an empty board, starting with `first`.
    fn reachable(first: Mark, max_moves: usize) -> Vec<Board> {
        let mut out = Vec::new();
        let mut frontier = vec![Board::EMPTY];
        for depth in 0..max_moves {
            let mark = if depth % 2 == 0 { first } else { first.opponent() };
            let mut next = Vec::new();
            for b in &frontier {
                if evaluate(b).is_over() {
                    continue;
                }
                for pos in b.available_moves() {
                    let mut child = *b;
                    child.place(pos, mark).unwrap();
                    next.push(child);
                }
            }
            out.extend(next.iter().copied());
            frontier = next;
        }
        out
    }

    #[test]
    fn rows_columns_and_diagonals_win() {
        assert_eq!(evaluate(&board("XXX OO. ...")), Evaluation::Winner(Mark::X));
        assert_eq!(evaluate(&board("XO. XO. .O.")), Evaluation::Winner(Mark::O));
        assert_eq!(evaluate(&board("X.O .XO ..X")), Evaluation::Winner(Mark::X));
        assert_eq!(evaluate(&board("X.O XO. O.X")), Evaluation::Winner(Mark::O));
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        assert_eq!(evaluate(&board("XOX XOO OXX")), Evaluation::Draw);
    }

    #[test]
    fn win_on_the_last_move_beats_draw() {
        assert_eq!(evaluate(&board("XOX OXO OXX")), Evaluation::Winner(Mark::X));
    }

    #[test]
    fn no_winner_before_five_moves() {
        for first in [Mark::X, Mark::O] {
            let positions = reachable(first, 4);
            assert!(!positions.is_empty());
            for position in positions {
                assert!(position.move_count() <= 4);
                assert!(
                    !matches!(evaluate(&position), Evaluation::Winner(_)),
                    "{position}"
                );
            }
        }
    }

    #[test]
    fn five_moves_can_win() {
        let positions = reachable(Mark::X, 5);
        assert!(
            positions
                .iter()
                .any(|b| evaluate(b) == Evaluation::Winner(Mark::X))
        );
    }

    #[test]
    fn placing_checks_range_and_occupancy() {
        let mut b = Board::EMPTY;
        b.place((1, 1), Mark::X).unwrap();

        assert_eq!(b.place((1, 1), Mark::O), Err(GameError::Occupied));
        assert_eq!(b.place((3, 0), Mark::O), Err(GameError::InvalidCoords));
        assert_eq!(b.available_moves().count(), 8);
    }

    #[test]
    fn off_board_cells_read_as_empty() {
        let b = board("XXX XXX XXX");
        assert_eq!(b.get((2, 2)), Some(Mark::X));
        assert_eq!(b.get((3, 0)), None);
        assert_eq!(b.get((0, 3)), None);
    }

    #[test]
    fn marks_parse_either_case() {
        assert_eq!("o".parse(), Ok(Mark::O));
        assert_eq!(" X ".parse(), Ok(Mark::X));
        assert!("y".parse::<Mark>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let b = board("X.O .X. O..");
        assert_eq!(b.to_string(), "X.O\n.X.\nO..");
        assert_eq!(b.to_string().parse::<Board>(), Ok(b));
    }
}
