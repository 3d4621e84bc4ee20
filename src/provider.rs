//! Edge cost and feasibility providers.
//!
//! The ACO core never looks at coordinates or matrices directly. It asks an
//! [`EdgeProvider`] for the cost of travelling between two stations and
//! whether that edge may be used at all.

use crate::error::{AcoError, AcoResult};
use crate::instance::{DistanceMatrix, Station, StationSet};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default maximum slope accepted on either end of an edge
pub const DEFAULT_MAX_SLOPE: f64 = 75.0;

/// Cost and feasibility of travelling between two stations
pub trait EdgeProvider: Send + Sync {
    /// Number of stations; ids are `0..num_stations()`
    fn num_stations(&self) -> usize;

    /// Cost of the directed edge `from -> to`
    fn cost(&self, from: usize, to: usize) -> f64;

    /// Whether the directed edge `from -> to` may be used
    fn feasible(&self, _from: usize, _to: usize) -> bool {
        true
    }

    /// Human readable name of a station
    fn station_name(&self, index: usize) -> String {
        index.to_string()
    }
}

/// Fetch an edge cost, rejecting negative or non-finite values
#[inline]
pub fn checked_cost(provider: &dyn EdgeProvider, from: usize, to: usize) -> AcoResult<f64> {
    let value = provider.cost(from, to);
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AcoError::InvalidProviderResponse { from, to, value })
    }
}

/// Great-circle distance in kilometers between two stations
pub fn haversine_distance(a: &Station, b: &Station) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let s1 = (delta_phi / 2.0).sin();
    let s2 = (delta_lambda / 2.0).sin();
    // Rounding can push h just past 1 for antipodal points
    let h = (s1 * s1 + phi1.cos() * phi2.cos() * s2 * s2).clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Geographic provider: Haversine cost, edges allowed only between stations
/// whose slopes are both at most `max_slope`.
#[derive(Debug, Clone)]
pub struct HaversineProvider {
    stations: Vec<Station>,
    max_slope: f64,
    distances: Vec<Vec<f64>>,
}

impl HaversineProvider {
    pub fn new(stations: StationSet, max_slope: f64) -> AcoResult<Self> {
        if !max_slope.is_finite() {
            return Err(AcoError::InvalidConfig(format!("max_slope must be finite, got {}", max_slope)));
        }

        let stations = stations.stations;
        let n = stations.len();
        let mut distances = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    distances[i][j] = haversine_distance(&stations[i], &stations[j]);
                }
            }
        }

        Ok(HaversineProvider {
            stations,
            max_slope,
            distances,
        })
    }

    pub fn max_slope(&self) -> f64 {
        self.max_slope
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }
}

impl EdgeProvider for HaversineProvider {
    fn num_stations(&self) -> usize {
        self.stations.len()
    }

    #[inline]
    fn cost(&self, from: usize, to: usize) -> f64 {
        self.distances[from][to]
    }

    #[inline]
    fn feasible(&self, from: usize, to: usize) -> bool {
        self.stations[from].slope.max(self.stations[to].slope) <= self.max_slope
    }

    fn station_name(&self, index: usize) -> String {
        self.stations[index].name.clone()
    }
}

/// Dense matrix provider; every edge is feasible
#[derive(Debug, Clone)]
pub struct MatrixProvider {
    matrix: DistanceMatrix,
}

impl MatrixProvider {
    pub fn new(matrix: DistanceMatrix) -> Self {
        MatrixProvider { matrix }
    }

    /// Convenience constructor for an anonymous matrix
    pub fn from_costs(costs: Vec<Vec<f64>>) -> AcoResult<Self> {
        Ok(MatrixProvider::new(DistanceMatrix::new("matrix", costs)?))
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }
}

impl EdgeProvider for MatrixProvider {
    fn num_stations(&self) -> usize {
        self.matrix.dimension()
    }

    #[inline]
    fn cost(&self, from: usize, to: usize) -> f64 {
        self.matrix.costs[from][to]
    }

    fn station_name(&self, index: usize) -> String {
        self.matrix.names[index].clone()
    }
}
