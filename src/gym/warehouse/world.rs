use std::collections::{BTreeSet, HashSet, VecDeque};

use log::debug;

use super::state::Cell;
use crate::error::{Error, Result};

/// Static geometry of a square warehouse floor
///
/// Racks are shelving units. An unloaded agent can drive underneath them, a loaded one
/// cannot. Drop-off cells are where carried racks are delivered. The layout never changes
/// after construction.
#[derive(Clone, Debug)]
pub struct World {
    size: i32,
    racks: HashSet<Cell>,
    dropoffs: Vec<Cell>,
}

impl World {
    /// A `size` x `size` floor with racks placed by [`place_racks`] and the bottom row as drop-off zone
    pub fn new(size: usize) -> Result<Self> {
        let racks = place_racks(size);
        let dropoffs = bottom_row(size, &racks);
        Self::with_layout(size, racks, dropoffs)
    }

    /// A `size` x `size` floor with an explicit layout
    ///
    /// Fails with [`Error::InvalidRackLayout`] if any cell is out of bounds, a drop-off sits on
    /// a rack, racks exist without any drop-off, the corridor cells are empty or split into
    /// disconnected regions, or a rack cannot be left by a loaded agent.
    pub fn with_layout(
        size: usize,
        racks: impl IntoIterator<Item = Cell>,
        dropoffs: impl IntoIterator<Item = Cell>,
    ) -> Result<Self> {
        let size = i32::try_from(size)
            .map_err(|_| Error::InvalidRackLayout(format!("grid size {size} is too large")))?;
        let dropoffs = dropoffs
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let world = Self {
            size,
            racks: racks.into_iter().collect(),
            dropoffs,
        };
        world.validate()?;

        debug!(
            "Warehouse floor {0}x{0} with {1} racks and {2} drop-off cells",
            world.size,
            world.racks.len(),
            world.dropoffs.len()
        );
        Ok(world)
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn is_in_bounds(&self, cell: Cell) -> bool {
        (0..self.size).contains(&cell.x) && (0..self.size).contains(&cell.y)
    }

    pub fn is_rack(&self, cell: Cell) -> bool {
        self.racks.contains(&cell)
    }

    pub fn is_dropoff(&self, cell: Cell) -> bool {
        self.dropoffs.binary_search(&cell).is_ok()
    }

    pub fn racks(&self) -> impl Iterator<Item = Cell> + '_ {
        self.racks.iter().copied()
    }

    /// Drop-off cells, sorted
    pub fn dropoffs(&self) -> &[Cell] {
        &self.dropoffs
    }

    /// The drop-off assigned to a rack picked up at `cell`
    ///
    /// Nearest by Manhattan distance, ties broken by smallest `(y, x)`.
    pub fn nearest_dropoff(&self, cell: Cell) -> Option<Cell> {
        self.dropoffs
            .iter()
            .copied()
            .min_by_key(|d| (d.manhattan(cell), d.y, d.x))
    }

    /// Fail unless `start` lies on the floor
    pub fn check_start(&self, start: Cell) -> Result<()> {
        if self.is_in_bounds(start) {
            Ok(())
        } else {
            Err(Error::InvalidRackLayout(format!(
                "initial location {start:?} is outside the {0}x{0} floor",
                self.size
            )))
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(Error::InvalidRackLayout(msg)) };

        if self.size == 0 {
            return invalid("the floor has no cells".into());
        }
        if let Some(rack) = self.racks.iter().find(|c| !self.is_in_bounds(**c)) {
            return invalid(format!("rack {rack:?} is out of bounds"));
        }
        if let Some(d) = self.dropoffs.iter().find(|c| !self.is_in_bounds(**c)) {
            return invalid(format!("drop-off {d:?} is out of bounds"));
        }
        if let Some(d) = self.dropoffs.iter().find(|c| self.is_rack(**c)) {
            return invalid(format!("drop-off {d:?} is on a rack"));
        }
        if !self.racks.is_empty() && self.dropoffs.is_empty() {
            return invalid("racks cannot be delivered without a drop-off cell".into());
        }

        let corridors = self.corridors();
        let Some(&start) = corridors.first() else {
            return invalid("every cell is a rack".into());
        };
        let reached = self.flood(start);
        if let Some(cut) = corridors.iter().find(|c| !reached.contains(*c)) {
            return invalid(format!(
                "corridor cell {cut:?} is cut off from {start:?} by racks"
            ));
        }

        if let Some(rack) = self.racks.iter().find(|r| {
            !r.neighbours()
                .iter()
                .any(|n| self.is_in_bounds(*n) && !self.is_rack(*n))
        }) {
            return invalid(format!("rack {rack:?} is enclosed by other racks"));
        }

        Ok(())
    }

    fn corridors(&self) -> Vec<Cell> {
        (0..self.size)
            .flat_map(|y| (0..self.size).map(move |x| Cell::new(x, y)))
            .filter(|c| !self.is_rack(*c))
            .collect()
    }

    /// Corridor cells 4-connected to `start`
    fn flood(&self, start: Cell) -> HashSet<Cell> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for n in cell.neighbours() {
                if self.is_in_bounds(n) && !self.is_rack(n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen
    }
}

/// The built-in rack placement for a `size` x `size` floor
///
/// Racks fill `2 <= x < size - 2`, `1 <= y < size - 2` in pairs of columns separated by
/// one-cell aisles. The first two columns, the top row and the bottom two rows stay free.
/// Floors smaller than 5 get no racks.
pub fn place_racks(size: usize) -> HashSet<Cell> {
    let Ok(size) = i32::try_from(size) else {
        return HashSet::new();
    };

    let mut racks = HashSet::new();
    for x in 2..size - 2 {
        if (x - 2) % 3 == 2 {
            continue;
        }
        for y in 1..size - 2 {
            racks.insert(Cell::new(x, y));
        }
    }
    racks
}

/// Bottom-row cells that are not racks
pub(crate) fn bottom_row(size: usize, racks: &HashSet<Cell>) -> Vec<Cell> {
    let Ok(size) = i32::try_from(size) else {
        return Vec::new();
    };

    (0..size)
        .map(|x| Cell::new(x, size - 1))
        .filter(|c| !racks.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> World {
        World::with_layout(3, [Cell::new(1, 1)], bottom_row(3, &HashSet::from([Cell::new(1, 1)])))
            .unwrap()
    }

    #[test]
    fn small_layout() {
        let world = small();
        assert!(world.is_rack(Cell::new(1, 1)));
        assert!(!world.is_rack(Cell::new(0, 0)));
        assert!(world.is_in_bounds(Cell::new(2, 2)));
        assert!(!world.is_in_bounds(Cell::new(3, 0)));
        assert!(!world.is_in_bounds(Cell::new(0, -1)));
        assert_eq!(
            world.dropoffs(),
            [Cell::new(0, 2), Cell::new(1, 2), Cell::new(2, 2)]
        );
        assert!(world.is_dropoff(Cell::new(1, 2)));
        assert!(!world.is_dropoff(Cell::new(1, 0)));
    }

    #[test]
    fn nearest_dropoff_breaks_ties() {
        let world = small();
        assert_eq!(world.nearest_dropoff(Cell::new(1, 1)), Some(Cell::new(1, 2)));
        assert_eq!(world.nearest_dropoff(Cell::new(1, 0)), Some(Cell::new(1, 2)));

        let two = World::with_layout(3, [], [Cell::new(0, 2), Cell::new(2, 2)]).unwrap();
        assert_eq!(
            two.nearest_dropoff(Cell::new(1, 0)),
            Some(Cell::new(0, 2)),
            "Equal distance picks the smaller x"
        );
    }

    #[test]
    fn built_in_layout_is_valid() {
        for size in [1, 3, 5, 6, 10, 20] {
            let world = World::new(size).unwrap();
            assert_eq!(world.size(), size);
            assert_eq!(world.dropoffs().len(), size, "Whole bottom row delivers");
        }

        let world = World::new(20).unwrap();
        assert!(world.is_rack(Cell::new(2, 1)));
        assert!(world.is_rack(Cell::new(3, 16)));
        assert!(!world.is_rack(Cell::new(4, 5)), "Aisle column");
        assert!(!world.is_rack(Cell::new(2, 0)), "Top row is free");
        assert!(world.is_rack(Cell::new(2, 17)), "Racks reach down to size - 3");
        assert!(!world.is_rack(Cell::new(2, 18)), "Bottom two rows are free");
        assert!(!world.is_rack(Cell::new(2, 19)), "Bottom two rows are free");
        assert!(!world.is_rack(Cell::new(18, 5)), "Right edge is free");
    }

    #[test]
    fn small_floors_have_no_racks() {
        assert!(place_racks(0).is_empty());
        assert!(place_racks(4).is_empty());
        assert!(!place_racks(5).is_empty());
    }

    #[test]
    fn rejects_partitioned_floor() {
        // A wall of racks across the middle row
        let wall = (0..3).map(|x| Cell::new(x, 1));
        let err = World::with_layout(3, wall, [Cell::new(0, 2)]).unwrap_err();
        assert!(matches!(err, Error::InvalidRackLayout(_)), "{err}");
    }

    #[test]
    fn rejects_bad_layouts() {
        let cases: Vec<(Vec<Cell>, Vec<Cell>)> = vec![
            (vec![Cell::new(5, 5)], vec![Cell::new(0, 2)]),
            (vec![Cell::new(1, 1)], vec![Cell::new(3, 3)]),
            (vec![Cell::new(1, 1)], vec![Cell::new(1, 1)]),
            (vec![Cell::new(1, 1)], vec![]),
        ];
        for (racks, dropoffs) in cases {
            assert!(
                World::with_layout(3, racks.clone(), dropoffs.clone()).is_err(),
                "racks {racks:?} with drop-offs {dropoffs:?} is rejected"
            );
        }
        assert!(World::with_layout(0, [], []).is_err(), "Empty floor");
    }

    #[test]
    fn rejects_enclosed_rack() {
        let racks = (0..3).flat_map(|x| (0..2).map(move |y| Cell::new(x, y)));
        // (1,0) is surrounded by racks and the boundary
        let err = World::with_layout(3, racks, [Cell::new(0, 2)]).unwrap_err();
        assert!(err.to_string().contains("enclosed"), "{err}");
    }

    #[test]
    fn start_must_be_on_floor() {
        let world = small();
        assert!(world.check_start(Cell::new(0, 0)).is_ok());
        assert!(world.check_start(Cell::new(1, 1)).is_ok(), "Unloaded agent may start on a rack");
        assert!(world.check_start(Cell::new(-1, 0)).is_err());
    }
}
