//! Geometric preview of a crossing request: where each slot's cells land,
//! and where two slots disagree.
//!
//! No lexicon is involved; the preview is drawn from the slots' compiled
//! patterns (wildcards shown as `_`) so it can be redrawn on every change.
//!
//! # Placement
//!
//! With two slots, slot 1 is placed so its crossing cell sits on
//! [`REFERENCE`] and slot 2's crossing cell coincides with it. With three,
//! slot 3 is placed so its first crossing cell sits on [`REFERENCE`], slot 1's
//! crossing cell coincides with that one, and slot 2's crossing cell coincides
//! with slot 3's second crossing cell.
//!
//! ```
//! use croisement::preview::build_preview;
//! use croisement::slot::SlotConstraint;
//!
//! let slots: Vec<SlotConstraint> = ["TES_/H/3", "SEAU/V/1"].iter().map(|s| s.parse().unwrap()).collect();
//! let grid = build_preview(&slots).unwrap();
//! assert_eq!(grid.to_string(), "T E S _\n· · E ·\n· · A ·\n· · U ·");
//! ```

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::cross_char::{CONFLICT_CELL, EMPTY_CELL};
use crate::slot::{Orientation, SlotConstraint};
use crate::solver::{plan, CrossingPlan, PlannedSlot};

/// Absolute coordinate the preview is anchored on.
pub const REFERENCE: (i64, i64) = (12, 6);

/// One cell of a [`PlacementGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    Empty,
    Letter(char),
    /// Two slots put different characters here.
    Conflict,
}

impl GridCell {
    /// The cell after `c` is placed on it.
    fn place(self, c: char) -> GridCell {
        match self {
            GridCell::Empty => GridCell::Letter(c),
            GridCell::Letter(prev) if prev == c => self,
            GridCell::Letter(_) | GridCell::Conflict => GridCell::Conflict,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            GridCell::Empty => EMPTY_CELL,
            GridCell::Letter(c) => c,
            GridCell::Conflict => CONFLICT_CELL,
        }
    }
}

/// Minimal bounding box of every placed cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementGrid {
    width: usize,
    height: usize,
    cells: Vec<GridCell>,
}

impl PlacementGrid {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at column `x`, row `y` of the box.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<GridCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(self.width)
    }

    /// `(x, y)` of every conflict, row by row.
    #[must_use]
    pub fn conflicts(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == GridCell::Conflict)
            .map(|(i, _)| (i % self.width, i / self.width))
            .collect()
    }
}

impl Display for PlacementGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(|cell| cell.as_char().to_string()).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Absolute coordinate of the 1-based `position`-th cell of a slot starting at `origin`.
fn cell_at(origin: (i64, i64), orientation: Orientation, position: usize) -> Option<(i64, i64)> {
    let (dx, dy) = orientation.step(i64::try_from(position).ok()? - 1);
    Some((origin.0 + dx, origin.1 + dy))
}

/// Origin of a slot whose `position`-th cell must sit on `target`.
fn origin_for(target: (i64, i64), orientation: Orientation, position: usize) -> Option<(i64, i64)> {
    let (dx, dy) = orientation.step(i64::try_from(position).ok()? - 1);
    Some((target.0 - dx, target.1 - dy))
}

/// Build the preview for two or three slots.
///
/// Returns `None` whenever a solve of the same slots would not be attempted:
/// a pattern compiling to nothing, a crossing position unset or out of range,
/// or slots that should cross sharing an axis.
#[must_use]
pub fn build_preview(slots: &[SlotConstraint]) -> Option<PlacementGrid> {
    let crossing = plan(slots).ok()?;

    let placed: Vec<(&PlannedSlot, (i64, i64))> = match &crossing {
        CrossingPlan::Pair { first, first_at, second, second_at } => vec![
            (first, origin_for(REFERENCE, first.slot.orientation, *first_at)?),
            (second, origin_for(REFERENCE, second.slot.orientation, *second_at)?),
        ],
        CrossingPlan::Triple { first, first_at, second, second_at, third, third_at_first, third_at_second } => {
            let third_origin = origin_for(REFERENCE, third.slot.orientation, *third_at_first)?;
            let meets_second = cell_at(third_origin, third.slot.orientation, *third_at_second)?;
            vec![
                (first, origin_for(REFERENCE, first.slot.orientation, *first_at)?),
                (second, origin_for(meets_second, second.slot.orientation, *second_at)?),
                (third, third_origin),
            ]
        }
    };

    let mut points: Vec<(i64, i64, char)> = Vec::new();
    for (planned, origin) in placed {
        for (i, cell) in planned.spec.cells().iter().enumerate() {
            let (x, y) = cell_at(origin, planned.slot.orientation, i + 1)?;
            points.push((x, y, cell.as_char()));
        }
    }

    rasterize(&points)
}

fn rasterize(points: &[(i64, i64, char)]) -> Option<PlacementGrid> {
    let min_x = points.iter().map(|p| p.0).min()?;
    let max_x = points.iter().map(|p| p.0).max()?;
    let min_y = points.iter().map(|p| p.1).min()?;
    let max_y = points.iter().map(|p| p.1).max()?;

    let width = usize::try_from(max_x - min_x + 1).ok()?;
    let height = usize::try_from(max_y - min_y + 1).ok()?;
    let mut cells = vec![GridCell::Empty; width * height];

    for &(x, y, c) in points {
        let gx = usize::try_from(x - min_x).ok()?;
        let gy = usize::try_from(y - min_y).ok()?;
        let cell = &mut cells[gy * width + gx];
        *cell = cell.place(c);
    }

    Some(PlacementGrid { width, height, cells })
}
