/// Double-buffered grid of surface cells.
///
/// Each step reads only `current` and writes only `next`; `commit_next_state`
/// swaps the buffers once the whole grid has been computed. No cell is ever
/// updated in place while its neighbours may still read it.

use crate::error::EbmResult;
use crate::grid::grid_cell::Cell;
use crate::grid::grid_mapper::GridMapper;
use crate::math_utils::weighted_mean;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct GridState {
    pub mapper: GridMapper,
    current: Vec<Cell>,
    next: Vec<Cell>,
}

/// Area-weighted summary of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStatistics {
    pub mean_temp_k: f64,
    pub min_temp_k: f64,
    pub max_temp_k: f64,
    pub mean_insolation_w_m2: f64,
    pub mean_albedo: f64,
    pub ice_area_fraction: f64,
    pub mean_ice_thickness_m: f64,
}

impl GridState {
    /// Every cell starts as a copy of `cell`.
    pub fn uniform(mapper: GridMapper, cell: Cell) -> Self {
        let cells = vec![cell; mapper.len()];
        Self {
            mapper,
            next: cells.clone(),
            current: cells,
        }
    }

    pub fn from_cells(mapper: GridMapper, cells: Vec<Cell>) -> EbmResult<Self> {
        mapper.ensure_len("initial grid state", cells.len())?;
        Ok(Self {
            mapper,
            next: cells.clone(),
            current: cells,
        })
    }

    pub fn current(&self) -> &[Cell] {
        &self.current
    }

    pub fn cell(&self, i: usize, j: usize) -> &Cell {
        &self.current[self.mapper.index(i, j)]
    }

    /// Frozen previous snapshot alongside the buffer being written.
    pub fn split_mut(&mut self) -> (&[Cell], &mut [Cell]) {
        (&self.current, &mut self.next)
    }

    /// Overwrites both buffers, used to seed the initial state.
    pub fn set_cells(&mut self, cells: Vec<Cell>) -> EbmResult<()> {
        self.mapper.ensure_len("grid state", cells.len())?;
        self.next.copy_from_slice(&cells);
        self.current = cells;
        Ok(())
    }

    /// Index of the first non-finite cell in the next buffer.
    pub fn first_non_finite_next(&self) -> Option<usize> {
        self.next.iter().position(|cell| !cell.is_finite())
    }

    /// Makes the freshly written buffer current.
    pub fn commit_next_state(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Throws away whatever was written into the next buffer.
    pub fn reset_next_state(&mut self) {
        self.next.copy_from_slice(&self.current);
    }

    /// Area-weighted mean of `field` over the current snapshot.
    pub fn area_weighted_mean(&self, field: impl Fn(&Cell) -> f64) -> f64 {
        let mapper = self.mapper;
        weighted_mean(
            self.current
                .iter()
                .enumerate()
                .map(|(index, cell)| (field(cell), mapper.area_weight(mapper.coords(index).1))),
        )
    }

    pub fn statistics(&self) -> GridStatistics {
        let (min_temp_k, max_temp_k) = self
            .current
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), cell| {
                (lo.min(cell.temperature_k), hi.max(cell.temperature_k))
            });

        GridStatistics {
            mean_temp_k: self.area_weighted_mean(|c| c.temperature_k),
            min_temp_k,
            max_temp_k,
            mean_insolation_w_m2: self.area_weighted_mean(|c| c.insolation_w_m2),
            mean_albedo: self.area_weighted_mean(|c| c.albedo),
            ice_area_fraction: self
                .area_weighted_mean(|c| if c.is_ice_covered() { 1.0 } else { 0.0 }),
            mean_ice_thickness_m: self.area_weighted_mean(|c| c.ice_thickness_m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid() -> GridMapper {
        GridMapper::new(4, 2).unwrap()
    }

    #[test]
    fn commit_swaps_buffers() {
        let mut state = GridState::uniform(grid(), Cell::default());
        {
            let (prev, next) = state.split_mut();
            for (out, old) in next.iter_mut().zip(prev) {
                out.temperature_k = old.temperature_k + 1.0;
            }
        }
        assert_abs_diff_eq!(state.current()[0].temperature_k, 273.15, epsilon = 1e-12);
        state.commit_next_state();
        assert_abs_diff_eq!(state.current()[0].temperature_k, 274.15, epsilon = 1e-12);
    }

    #[test]
    fn reset_discards_next() {
        let mut state = GridState::uniform(grid(), Cell::default());
        state.split_mut().1[3].temperature_k = f64::NAN;
        assert_eq!(state.first_non_finite_next(), Some(3));
        state.reset_next_state();
        assert_eq!(state.first_non_finite_next(), None);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let err = GridState::from_cells(grid(), vec![Cell::default(); 7]).unwrap_err();
        assert!(err.to_string().contains("expected a 4x2 grid"));
    }

    #[test]
    fn statistics_on_uniform_grid() {
        let state = GridState::uniform(grid(), Cell::open_water(280.0, 1.0));
        let stats = state.statistics();
        assert_abs_diff_eq!(stats.mean_temp_k, 280.0, epsilon = 1e-9);
        assert_eq!(stats.min_temp_k, 280.0);
        assert_eq!(stats.max_temp_k, 280.0);
        assert_eq!(stats.ice_area_fraction, 0.0);
    }
}
