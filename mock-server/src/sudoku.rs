//! Just enough sudoku for the mock solver endpoints: a bitmask backtracking
//! solver that counts solutions, a generator that removes clues while the
//! solution stays unique, and single-step hints.

use rand::seq::SliceRandom;
use rand::Rng;

pub type Grid = [u8; 81];

const ALL: u16 = 0b11_1111_1110;

pub fn parse(s: &str) -> Option<Grid> {
    if s.chars().count() != 81 {
        return None;
    }
    let mut grid = [0u8; 81];
    for (i, c) in s.chars().enumerate() {
        grid[i] = match c {
            '.' | '0' => 0,
            '1'..='9' => c as u8 - b'0',
            _ => return None,
        };
    }
    Some(grid)
}

pub fn format(grid: &Grid) -> String {
    grid.iter().map(|d| char::from(b'0' + d)).collect()
}

fn peers(i: usize) -> impl Iterator<Item = usize> {
    let (r, c) = (i / 9, i % 9);
    let (br, bc) = (r / 3 * 3, c / 3 * 3);
    (0..9)
        .map(move |k| r * 9 + k)
        .chain((0..9).map(move |k| k * 9 + c))
        .chain((0..9).map(move |k| (br + k / 3) * 9 + bc + k % 3))
        .filter(move |&p| p != i)
}

/// Candidate bitmask for an empty cell (bit `d` set when `d` fits).
pub fn candidates(grid: &Grid, i: usize) -> u16 {
    peers(i).fold(ALL, |mask, p| mask & !(1 << grid[p]))
}

/// True when no filled cell conflicts with a peer.
pub fn consistent(grid: &Grid) -> bool {
    (0..81).all(|i| grid[i] == 0 || peers(i).all(|p| grid[p] != grid[i]))
}

/// Count solutions, stopping at `limit`. Returns the first solution found.
pub fn count_solutions(grid: &Grid, limit: usize) -> (usize, Option<Grid>) {
    if !consistent(grid) {
        return (0, None);
    }
    let mut work = *grid;
    let mut first = None;
    let count = search(&mut work, limit, &mut first);
    (count, first)
}

fn search(grid: &mut Grid, limit: usize, first: &mut Option<Grid>) -> usize {
    let mut best: Option<(usize, u16)> = None;
    for i in 0..81 {
        if grid[i] != 0 {
            continue;
        }
        let mask = candidates(grid, i);
        if mask == 0 {
            return 0;
        }
        if best.map_or(true, |(_, m)| mask.count_ones() < m.count_ones()) {
            best = Some((i, mask));
        }
    }
    let Some((cell, mask)) = best else {
        if first.is_none() {
            *first = Some(*grid);
        }
        return 1;
    };
    let mut total = 0;
    for d in 1..=9u8 {
        if mask & (1 << d) == 0 {
            continue;
        }
        grid[cell] = d;
        total += search(grid, limit - total, first);
        grid[cell] = 0;
        if total >= limit {
            break;
        }
    }
    total
}

/// A full grid from the canonical pattern, shuffled by digit relabeling and
/// row/column swaps inside bands and stacks.
fn solved_grid(rng: &mut impl Rng) -> Grid {
    let mut digits: Vec<u8> = (1..=9).collect();
    digits.shuffle(rng);
    let mut rows: Vec<usize> = Vec::new();
    let mut bands = [0usize, 1, 2];
    bands.shuffle(rng);
    for b in bands {
        let mut inner = [0usize, 1, 2];
        inner.shuffle(rng);
        rows.extend(inner.iter().map(|r| b * 3 + r));
    }
    let mut cols: Vec<usize> = Vec::new();
    let mut stacks = [0usize, 1, 2];
    stacks.shuffle(rng);
    for s in stacks {
        let mut inner = [0usize, 1, 2];
        inner.shuffle(rng);
        cols.extend(inner.iter().map(|c| s * 3 + c));
    }
    let mut grid = [0u8; 81];
    for r in 0..9 {
        for c in 0..9 {
            let (pr, pc) = (rows[r], cols[c]);
            let pattern = (pr * 3 + pr / 3 + pc) % 9;
            grid[r * 9 + c] = digits[pattern];
        }
    }
    grid
}

/// Returns `(puzzle, solution)`; the puzzle always has a unique solution.
pub fn generate(symmetrical: bool, rng: &mut impl Rng) -> (Grid, Grid) {
    let solution = solved_grid(rng);
    let mut puzzle = solution;
    let mut order: Vec<usize> = (0..81).collect();
    order.shuffle(rng);
    for i in order {
        if puzzle[i] == 0 {
            continue;
        }
        let mirror = 80 - i;
        let saved = (puzzle[i], puzzle[mirror]);
        puzzle[i] = 0;
        if symmetrical {
            puzzle[mirror] = 0;
        }
        if count_solutions(&puzzle, 2).0 != 1 {
            puzzle[i] = saved.0;
            puzzle[mirror] = saved.1;
        }
    }
    (puzzle, solution)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub title: &'static str,
    pub cell: usize,
    pub value: u8,
}

/// The next single-candidate step: naked single first, then hidden single.
pub fn next_step(grid: &Grid) -> Option<Step> {
    for i in 0..81 {
        if grid[i] == 0 {
            let mask = candidates(grid, i);
            if mask.count_ones() == 1 {
                return Some(Step {
                    title: "Naked Single",
                    cell: i,
                    value: mask.trailing_zeros() as u8,
                });
            }
        }
    }
    let units = (0..9)
        .map(|r| (0..9).map(|c| r * 9 + c).collect::<Vec<_>>())
        .chain((0..9).map(|c| (0..9).map(|r| r * 9 + c).collect()))
        .chain((0..9).map(|b| {
            (0..9)
                .map(|k| (b / 3 * 3 + k / 3) * 9 + b % 3 * 3 + k % 3)
                .collect()
        }));
    for unit in units {
        for d in 1..=9u8 {
            let spots: Vec<usize> = unit
                .iter()
                .copied()
                .filter(|&i| grid[i] == 0 && candidates(grid, i) & (1 << d) != 0)
                .collect();
            if spots.len() == 1 {
                return Some(Step {
                    title: "Hidden Single",
                    cell: spots[0],
                    value: d,
                });
            }
        }
    }
    None
}
