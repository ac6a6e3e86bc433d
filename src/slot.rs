//! Word slots: orientation, pattern and crossing positions.
//!
//! Slots are written on the command line as `PATTERN/ORIENTATION[/POS[,POS]]`:
//!
//! - `TE__/H/3`: horizontal, crosses the other slot at its 3rd cell
//! - `__AU/V/1`: vertical, crosses at its 1st cell
//! - `T___/V/1,4`: third slot, crosses slot 1 at its 1st cell and slot 2 at its 4th
//! - `TE__/H`: no crossing chosen yet

use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag_no_case},
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, value},
    multi::separated_list1,
    sequence::preceded,
    IResult,
    Parser,
};

use crate::errors::SlotSpecError;
use crate::pattern::{compile, PatternSpec};

/// The axis a slot runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        self == Orientation::Horizontal
    }

    /// Cell offset `(dx, dy)` of the `i`-th cell from a slot's origin.
    #[must_use]
    pub(crate) fn step(self, i: i64) -> (i64, i64) {
        match self {
            Orientation::Horizontal => (i, 0),
            Orientation::Vertical => (0, i),
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "H"),
            Orientation::Vertical => write!(f, "V"),
        }
    }
}

fn orientation(input: &str) -> IResult<&str, Orientation> {
    alt((
        value(Orientation::Horizontal, alt((tag_no_case("horizontal"), tag_no_case("h")))),
        value(Orientation::Vertical, alt((tag_no_case("vertical"), tag_no_case("v")))),
    ))
    .parse(input)
}

impl FromStr for Orientation {
    type Err = SlotSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(orientation)
            .parse(s.trim())
            .map(|(_, o)| o)
            .map_err(|_| SlotSpecError::Invalid { spec: s.to_string() })
    }
}

/// One word slot of a crossing search.
///
/// `crossing` is the 1-based cell where this slot meets another one. Only the
/// third slot of a three-slot search uses `second_crossing`: then `crossing`
/// meets slot 1 and `second_crossing` meets slot 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConstraint {
    /// Raw pattern as typed (compiled on demand).
    pub pattern: String,
    pub orientation: Orientation,
    pub crossing: Option<usize>,
    pub second_crossing: Option<usize>,
}

impl SlotConstraint {
    #[must_use]
    pub fn new(pattern: &str, orientation: Orientation) -> Self {
        SlotConstraint { pattern: pattern.to_string(), orientation, crossing: None, second_crossing: None }
    }

    #[must_use]
    pub fn crossing_at(mut self, position: usize) -> Self {
        self.crossing = Some(position);
        self
    }

    /// Positions where a third slot meets slot 1 and slot 2.
    #[must_use]
    pub fn crossing_at_both(mut self, with_first: usize, with_second: usize) -> Self {
        self.crossing = Some(with_first);
        self.second_crossing = Some(with_second);
        self
    }

    /// The compiled pattern, `None` if it leaves nothing to match.
    #[must_use]
    pub fn compile(&self) -> Option<PatternSpec> {
        compile(&self.pattern)
    }

    /// Number of cells a crossing position can point at (0 if the pattern
    /// compiles to nothing).
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.compile().map_or(0, |spec| spec.cell_count())
    }

    /// Forget crossing positions that no longer point inside the pattern,
    /// e.g. after the pattern was shortened.
    pub fn retain_valid_crossings(&mut self) {
        let cell_count = self.cell_count();
        let in_range = |p: &usize| (1..=cell_count).contains(p);
        self.crossing = self.crossing.filter(in_range);
        self.second_crossing = self.second_crossing.filter(in_range);
    }
}

impl Display for SlotConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pattern, self.orientation)?;
        match (self.crossing, self.second_crossing) {
            (Some(a), Some(b)) => write!(f, "/{a},{b}"),
            (Some(a), None) => write!(f, "/{a}"),
            (None, _) => Ok(()),
        }
    }
}

type RawSlotSpec<'a> = (&'a str, Orientation, Option<Vec<usize>>);

fn slot_spec(input: &str) -> IResult<&str, RawSlotSpec<'_>> {
    (
        is_not("/"),
        preceded(char('/'), orientation),
        opt(preceded(char('/'), separated_list1(char(','), map_res(digit1, str::parse::<usize>)))),
    )
        .parse(input)
}

impl FromStr for SlotConstraint {
    type Err = SlotSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let (_, (pattern, orientation, positions)) =
            all_consuming(slot_spec).parse(spec).map_err(|_| SlotSpecError::Invalid { spec: spec.to_string() })?;

        let positions = positions.unwrap_or_default();
        if positions.contains(&0) {
            return Err(SlotSpecError::ZeroPosition { spec: spec.to_string() });
        }

        let mut slot = SlotConstraint::new(pattern.trim(), orientation);
        match positions.as_slice() {
            [] => {}
            [a] => slot = slot.crossing_at(*a),
            [a, b] => slot = slot.crossing_at_both(*a, *b),
            _ => return Err(SlotSpecError::TooManyPositions { spec: spec.to_string(), count: positions.len() }),
        }
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_str() {
        assert_eq!("H".parse::<Orientation>(), Ok(Orientation::Horizontal));
        assert_eq!("v".parse::<Orientation>(), Ok(Orientation::Vertical));
        assert_eq!(" Horizontal ".parse::<Orientation>(), Ok(Orientation::Horizontal));
        assert_eq!("VERTICAL".parse::<Orientation>(), Ok(Orientation::Vertical));
        assert!("X".parse::<Orientation>().is_err());
        assert!("hv".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_parse_slot_with_one_position() {
        let slot: SlotConstraint = "TE__/H/3".parse().unwrap();
        assert_eq!(slot, SlotConstraint::new("TE__", Orientation::Horizontal).crossing_at(3));
    }

    #[test]
    fn test_parse_slot_with_two_positions() {
        let slot: SlotConstraint = "-t___*/v/1,4".parse().unwrap();
        assert_eq!(slot.pattern, "-t___*");
        assert_eq!(slot.orientation, Orientation::Vertical);
        assert_eq!(slot.crossing, Some(1));
        assert_eq!(slot.second_crossing, Some(4));
    }

    #[test]
    fn test_parse_slot_without_position() {
        let slot: SlotConstraint = "TE__/H".parse().unwrap();
        assert_eq!(slot.crossing, None);
        assert_eq!(slot.second_crossing, None);
    }

    #[test]
    fn test_parse_slot_errors() {
        assert!(matches!("TE__".parse::<SlotConstraint>(), Err(SlotSpecError::Invalid { .. })));
        assert!(matches!("TE__/D/3".parse::<SlotConstraint>(), Err(SlotSpecError::Invalid { .. })));
        assert!(matches!("TE__/H/x".parse::<SlotConstraint>(), Err(SlotSpecError::Invalid { .. })));
        assert!(matches!("/H/1".parse::<SlotConstraint>(), Err(SlotSpecError::Invalid { .. })));
        assert!(matches!("TE__/H/0".parse::<SlotConstraint>(), Err(SlotSpecError::ZeroPosition { .. })));
        assert!(matches!(
            "TE__/H/1,2,3".parse::<SlotConstraint>(),
            Err(SlotSpecError::TooManyPositions { count: 3, .. })
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for spec in ["TE__/H/3", "__AU/V/1", "T___/V/1,4", "TE/H"] {
            let slot: SlotConstraint = spec.parse().unwrap();
            assert_eq!(slot.to_string(), spec);
        }
    }

    #[test]
    fn test_cell_count() {
        assert_eq!(SlotConstraint::new("-TE__*", Orientation::Horizontal).cell_count(), 4);
        assert_eq!(SlotConstraint::new("-*", Orientation::Horizontal).cell_count(), 0);
    }

    #[test]
    fn test_retain_valid_crossings() {
        let mut slot = SlotConstraint::new("TE__", Orientation::Vertical).crossing_at_both(2, 4);
        slot.pattern = "TE_".to_string();
        slot.retain_valid_crossings();
        assert_eq!(slot.crossing, Some(2));
        assert_eq!(slot.second_crossing, None);

        slot.pattern = String::new();
        slot.retain_valid_crossings();
        assert_eq!(slot.crossing, None);
    }

    #[test]
    fn test_step() {
        assert_eq!(Orientation::Horizontal.step(3), (3, 0));
        assert_eq!(Orientation::Vertical.step(3), (0, 3));
    }
}
