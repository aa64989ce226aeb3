/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Geo-cell bucketing of driver identifiers.
//!
//! The plane is partitioned by geohash cells of a fixed precision. A geohash of precision `p`
//! interleaves `ceil(5p / 2)` longitude bits with `floor(5p / 2)` latitude bits, so its cells form a
//! regular `rows x cols` grid over `[-90, 90] x [-180, 180]` and every cell can be addressed either
//! by its hash or by its `(row, col)` position. Hashes key the buckets; positions drive the radius
//! covering.

use crate::common::{types::*, utils::*};
use crate::tools::{error::AppError, logger::*};
use geohash::Coord;
use rustc_hash::{FxHashMap, FxHashSet};
use std::f64::consts::PI;

/// Longest geohash the `geohash` crate encodes.
pub const MAX_CELL_PRECISION: usize = 12;

const KM_PER_DEGREE: f64 = EARTH_RADIUS_IN_METERS / 1000.0 * PI / 180.0;

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct CellId(pub String);

#[derive(Clone, Copy, Debug)]
pub struct CellGrid {
    precision: usize,
    rows: i64,
    cols: i64,
    cell_height: f64,
    cell_width: f64,
}

impl CellGrid {
    pub fn new(precision: usize) -> Result<Self, AppError> {
        if precision == 0 || precision > MAX_CELL_PRECISION {
            return Err(AppError::InvalidConfiguration(format!(
                "cell_precision must be within 1..={MAX_CELL_PRECISION}, got {precision}"
            )));
        }

        let bits = 5 * precision as u32;
        let lon_bits = (bits + 1) / 2;
        let lat_bits = bits / 2;
        let rows = 1i64 << lat_bits;
        let cols = 1i64 << lon_bits;

        Ok(Self {
            precision,
            rows,
            cols,
            cell_height: 180.0 / rows as f64,
            cell_width: 360.0 / cols as f64,
        })
    }

    /// Cell dimensions in degrees as `(height, width)`.
    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_height, self.cell_width)
    }

    pub fn cell_of(&self, point: &Point) -> Result<CellId, AppError> {
        let Latitude(lat) = point.lat;
        let Longitude(lon) = point.lon;
        geohash::encode(Coord { x: lon, y: lat }, self.precision)
            .map(CellId)
            .map_err(|_| AppError::InvalidCoordinate(lat, lon))
    }

    fn row_of(&self, lat: f64) -> i64 {
        (((lat + 90.0) / self.cell_height).floor() as i64).clamp(0, self.rows - 1)
    }

    /// Unbounded column; callers wrap it around the antimeridian.
    fn col_of(&self, lon: f64) -> i64 {
        ((lon + 180.0) / self.cell_width).floor() as i64
    }

    fn position_of(&self, cell: &CellId) -> Result<(i64, i64), AppError> {
        let (center, _, _) = geohash::decode(&cell.0).map_err(|err| {
            AppError::InternalError(format!("Undecodable geo-cell {} : {err}", cell.0))
        })?;
        Ok((
            self.row_of(center.y),
            self.col_of(center.x).rem_euclid(self.cols),
        ))
    }

    fn cell_at(&self, row: i64, col: i64) -> Result<CellId, AppError> {
        let lat = -90.0 + (row as f64 + 0.5) * self.cell_height;
        let lon = -180.0 + (col as f64 + 0.5) * self.cell_width;
        self.cell_of(&Point {
            lat: Latitude(lat),
            lon: Longitude(lon),
        })
    }

    /// Block of cells covering the circle of `radius` around `center`, plus one ring of margin.
    ///
    /// The latitude extent of a spherical cap is exact. The longitude extent is bounded using the
    /// latitude of the box edge farthest from the equator, which over-covers but never misses a
    /// cell. A box reaching a pole, or one wider than the globe, spans every column.
    pub fn covering(&self, center: &Point, Radius(radius_km): &Radius) -> CellWindow {
        let Latitude(lat) = center.lat;
        let Longitude(lon) = center.lon;

        let lat_delta = radius_km / KM_PER_DEGREE;
        let min_lat = lat - lat_delta;
        let max_lat = lat + lat_delta;

        let row_lo = (self.row_of(min_lat) - 1).max(0);
        let row_hi = (self.row_of(max_lat) + 1).min(self.rows - 1);

        let full_window = CellWindow {
            row_lo,
            row_hi,
            col_lo: 0,
            col_hi: self.cols - 1,
            cols: self.cols,
            all_cols: true,
        };

        if min_lat <= -90.0 || max_lat >= 90.0 {
            return full_window;
        }

        let widest_lat = min_lat.abs().max(max_lat.abs());
        let cos_widest = deg2rad(widest_lat).cos();
        if cos_widest <= f64::EPSILON {
            return full_window;
        }

        let lon_delta = lat_delta / cos_widest;
        if 2.0 * lon_delta >= 360.0 {
            return full_window;
        }

        let col_lo = self.col_of(lon - lon_delta) - 1;
        let col_hi = self.col_of(lon + lon_delta) + 1;
        if col_hi - col_lo + 1 >= self.cols {
            return full_window;
        }

        CellWindow {
            row_lo,
            row_hi,
            col_lo,
            col_hi,
            cols: self.cols,
            all_cols: false,
        }
    }

    /// Every cell of [`CellGrid::covering`], as geohashes.
    pub fn covering_cells(&self, center: &Point, radius: &Radius) -> Result<Vec<CellId>, AppError> {
        self.covering(center, radius)
            .positions()
            .map(|(row, col)| self.cell_at(row, col))
            .collect()
    }
}

/// Rectangular block of grid positions; columns may wrap across the antimeridian.
#[derive(Clone, Copy, Debug)]
pub struct CellWindow {
    row_lo: i64,
    row_hi: i64,
    col_lo: i64,
    col_hi: i64,
    cols: i64,
    all_cols: bool,
}

impl CellWindow {
    pub fn len(&self) -> u64 {
        let rows = (self.row_hi - self.row_lo + 1).max(0) as u64;
        let cols = (self.col_hi - self.col_lo + 1).max(0) as u64;
        rows.saturating_mul(cols)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn spans_all_columns(&self) -> bool {
        self.all_cols
    }

    pub fn contains(&self, row: i64, col: i64) -> bool {
        if row < self.row_lo || row > self.row_hi {
            return false;
        }
        self.all_cols || (col - self.col_lo).rem_euclid(self.cols) <= self.col_hi - self.col_lo
    }

    pub fn positions(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (self.row_lo..=self.row_hi).flat_map(move |row| {
            (self.col_lo..=self.col_hi).map(move |col| (row, col.rem_euclid(self.cols)))
        })
    }
}

struct CellBucket {
    row: i64,
    col: i64,
    drivers: FxHashSet<DriverId>,
}

/// Where a driver ended up after [`SpatialIndex::place`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Placement {
    Inserted,
    Moved,
    Stayed,
}

/// Projection of the location records onto geo-cells.
///
/// `membership` and `cells` are two views of the same relation: a driver listed in `membership`
/// under cell `c` is in `cells[c]` and in no other bucket.
pub struct SpatialIndex {
    grid: CellGrid,
    cells: FxHashMap<CellId, CellBucket>,
    membership: FxHashMap<DriverId, CellId>,
}

impl SpatialIndex {
    pub fn new(grid: CellGrid) -> Self {
        Self {
            grid,
            cells: FxHashMap::default(),
            membership: FxHashMap::default(),
        }
    }

    pub fn cell_of(&self, driver_id: &DriverId) -> Option<&CellId> {
        self.membership.get(driver_id)
    }

    pub fn len(&self) -> usize {
        self.membership.len()
    }

    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Puts `driver_id` into `cell`, moving it out of its previous cell in the same step.
    ///
    /// `previously_indexed` is what the caller's location record says about the driver. Any
    /// disagreement with the index is an invariant violation: it is logged and reported, and
    /// the index is left untouched.
    pub fn place(
        &mut self,
        driver_id: &DriverId,
        cell: CellId,
        previously_indexed: bool,
    ) -> Result<Placement, AppError> {
        let current = self.membership.get(driver_id).cloned();

        if current.is_some() != previously_indexed {
            return Err(self.inconsistency(driver_id, "membership disagrees with location record"));
        }

        match current {
            Some(current) if current == cell => {
                if !self.bucket_contains(&current, driver_id) {
                    return Err(self.inconsistency(driver_id, "driver missing from its cell"));
                }
                Ok(Placement::Stayed)
            }
            Some(current) => {
                if !self.bucket_contains(&current, driver_id) {
                    return Err(self.inconsistency(driver_id, "driver missing from its cell"));
                }
                let bucket_position = self.bucket_position(&cell)?;
                self.remove_from_bucket(&current, driver_id);
                self.insert_into_bucket(cell.to_owned(), bucket_position, driver_id);
                self.membership.insert(driver_id.to_owned(), cell);
                Ok(Placement::Moved)
            }
            None => {
                if self.bucket_contains(&cell, driver_id) {
                    return Err(self.inconsistency(driver_id, "unindexed driver found in a cell"));
                }
                let bucket_position = self.bucket_position(&cell)?;
                self.insert_into_bucket(cell.to_owned(), bucket_position, driver_id);
                self.membership.insert(driver_id.to_owned(), cell);
                Ok(Placement::Inserted)
            }
        }
    }

    /// Drops `driver_id` from the index. Absent drivers are a no-op.
    pub fn evict(&mut self, driver_id: &DriverId) -> Result<(), AppError> {
        let Some(cell) = self.membership.get(driver_id).cloned() else {
            return Ok(());
        };
        if !self.bucket_contains(&cell, driver_id) {
            return Err(self.inconsistency(driver_id, "driver missing from its cell"));
        }
        self.remove_from_bucket(&cell, driver_id);
        self.membership.remove(driver_id);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.membership.clear();
    }

    /// Drivers whose cell intersects the covering of the query circle.
    ///
    /// When the covering is larger than the set of occupied cells, the occupied cells are scanned
    /// instead of enumerating the covering; both paths yield the same drivers.
    pub fn candidates(&self, center: &Point, radius: &Radius) -> Vec<DriverId> {
        let window = self.grid.covering(center, radius);
        let mut candidates = Vec::new();

        if window.len() <= self.cells.len() as u64 {
            for (row, col) in window.positions() {
                match self.grid.cell_at(row, col) {
                    Ok(cell) => {
                        if let Some(bucket) = self.cells.get(&cell) {
                            candidates.extend(bucket.drivers.iter().cloned());
                        }
                    }
                    Err(err) => {
                        error!(tag = "[Geo Cell Enumeration]", row = row, col = col, error = %err);
                    }
                }
            }
        } else {
            for bucket in self.cells.values() {
                if window.contains(bucket.row, bucket.col) {
                    candidates.extend(bucket.drivers.iter().cloned());
                }
            }
        }

        candidates
    }

    fn bucket_contains(&self, cell: &CellId, driver_id: &DriverId) -> bool {
        self.cells
            .get(cell)
            .map(|bucket| bucket.drivers.contains(driver_id))
            .unwrap_or(false)
    }

    fn bucket_position(&self, cell: &CellId) -> Result<(i64, i64), AppError> {
        match self.cells.get(cell) {
            Some(bucket) => Ok((bucket.row, bucket.col)),
            None => self.grid.position_of(cell),
        }
    }

    fn insert_into_bucket(&mut self, cell: CellId, (row, col): (i64, i64), driver_id: &DriverId) {
        self.cells
            .entry(cell)
            .or_insert_with(|| CellBucket {
                row,
                col,
                drivers: FxHashSet::default(),
            })
            .drivers
            .insert(driver_id.to_owned());
    }

    fn remove_from_bucket(&mut self, cell: &CellId, driver_id: &DriverId) {
        let now_empty = match self.cells.get_mut(cell) {
            Some(bucket) => {
                bucket.drivers.remove(driver_id);
                bucket.drivers.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.cells.remove(cell);
        }
    }

    /// Drops `driver_id` from its bucket while leaving its membership entry behind.
    #[cfg(test)]
    pub(crate) fn detach_from_cell(&mut self, driver_id: &DriverId) {
        if let Some(cell) = self.membership.get(driver_id).cloned() {
            self.remove_from_bucket(&cell, driver_id);
        }
    }

    fn inconsistency(&self, driver_id: &DriverId, reason: &str) -> AppError {
        error!(
            tag = "[Index Invariant Violated]",
            driver_id = %driver_id,
            cell = ?self.membership.get(driver_id),
            "{reason}"
        );
        AppError::IndexInconsistency(driver_id.to_string())
    }
}
