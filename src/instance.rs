//! Module for loading and describing station instances.
//!
//! Two input shapes are supported: a list of geographic stations (latitude,
//! longitude and slope) and a precomputed dense cost matrix. Both are plain
//! JSON documents.

use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{AcoError, AcoResult};
use crate::provider::{checked_cost, EdgeProvider};

/// A geographic station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Display name (`Station_1`, `Station_2`, ... when loaded from file)
    pub name: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Terrain slope at the station
    pub slope: f64,
}

impl Station {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, slope: f64) -> Self {
        Station {
            name: name.into(),
            latitude,
            longitude,
            slope,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CoordinateRecord {
    latitude: f64,
    longitude: f64,
    slope: f64,
}

#[derive(Debug, Deserialize)]
struct CoordinateFile {
    coordinates: Vec<CoordinateRecord>,
}

/// An ordered collection of stations; the index in `stations` is the station id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSet {
    /// Name of the instance (file stem when loaded from disk)
    pub name: String,
    pub stations: Vec<Station>,
}

impl StationSet {
    pub fn new(name: impl Into<String>, stations: Vec<Station>) -> Self {
        StationSet {
            name: name.into(),
            stations,
        }
    }

    /// Parse a `{"coordinates": [{"latitude", "longitude", "slope"}, ...]}` document
    pub fn from_json_str(name: &str, json: &str) -> AcoResult<Self> {
        let file: CoordinateFile = serde_json::from_str(json)?;

        let stations = file
            .coordinates
            .into_iter()
            .enumerate()
            .map(|(i, c)| Station::new(format!("Station_{}", i + 1), c.latitude, c.longitude, c.slope))
            .collect();

        Ok(StationSet::new(name, stations))
    }

    /// Load a station file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&instance_name(path), &json)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct MatrixFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    names: Option<Vec<String>>,
    matrix: Vec<Vec<f64>>,
}

/// A dense, row-major N x N cost matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrix {
    pub name: String,
    /// Station names, one per row
    pub names: Vec<String>,
    /// `costs[i][j]` is the cost of travelling from `i` to `j`
    pub costs: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Build a matrix, checking that it is square. Stations are named `0..n`.
    pub fn new(name: impl Into<String>, costs: Vec<Vec<f64>>) -> AcoResult<Self> {
        let names = (0..costs.len()).map(|i| i.to_string()).collect();
        Self::with_names(name, names, costs)
    }

    pub fn with_names(name: impl Into<String>, names: Vec<String>, costs: Vec<Vec<f64>>) -> AcoResult<Self> {
        let n = costs.len();
        if let Some((row, r)) = costs.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(AcoError::InvalidInstance(format!(
                "matrix row {} has {} entries, expected {}",
                row,
                r.len(),
                n
            )));
        }
        if names.len() != n {
            return Err(AcoError::InvalidInstance(format!(
                "{} station names given for a {}x{} matrix",
                names.len(),
                n,
                n
            )));
        }

        Ok(DistanceMatrix {
            name: name.into(),
            names,
            costs,
        })
    }

    /// Parse a `{"name"?, "names"?, "matrix": [[...]]}` document
    pub fn from_json_str(default_name: &str, json: &str) -> AcoResult<Self> {
        let file: MatrixFile = serde_json::from_str(json)?;
        let name = file.name.unwrap_or_else(|| default_name.to_string());

        match file.names {
            Some(names) => Self::with_names(name, names, file.matrix),
            None => Self::new(name, file.matrix),
        }
    }

    /// Load a matrix file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&instance_name(path), &json)
    }

    pub fn dimension(&self) -> usize {
        self.costs.len()
    }
}

fn instance_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "instance".to_string())
}

/// Statistics about an instance, as seen through its edge provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_stations: usize,
    pub feasible_edges: usize,
    pub infeasible_edges: usize,
    pub avg_cost: f64,
    pub max_cost: f64,
}

impl InstanceStatistics {
    /// Collect statistics over every ordered pair of distinct stations.
    /// Fails on the first negative or non-finite edge cost.
    pub fn collect(name: &str, provider: &dyn EdgeProvider) -> AcoResult<Self> {
        let n = provider.num_stations();
        let mut feasible_edges = 0;
        let mut infeasible_edges = 0;
        let mut total = 0.0;
        let mut max_cost: f64 = 0.0;

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                if provider.feasible(i, j) {
                    feasible_edges += 1;
                } else {
                    infeasible_edges += 1;
                }
                let cost = checked_cost(provider, i, j)?;
                total += cost;
                max_cost = max_cost.max(cost);
            }
        }

        let edges = feasible_edges + infeasible_edges;
        let avg_cost = if edges > 0 { total / edges as f64 } else { 0.0 };

        Ok(InstanceStatistics {
            name: name.to_string(),
            num_stations: n,
            feasible_edges,
            infeasible_edges,
            avg_cost,
            max_cost,
        })
    }
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Stations: {}", self.num_stations)?;
        writeln!(f, "  Feasible edges: {}", self.feasible_edges)?;
        writeln!(f, "  Infeasible edges: {}", self.infeasible_edges)?;
        writeln!(f, "  Avg cost: {:.2}", self.avg_cost)?;
        writeln!(f, "  Max cost: {:.2}", self.max_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MatrixProvider;

    #[test]
    fn test_station_file_parsing() {
        let json = r#"{"coordinates": [
            {"latitude": 48.85, "longitude": 2.35, "slope": 10.0},
            {"latitude": 45.76, "longitude": 4.83, "slope": 80.0}
        ]}"#;
        let set = StationSet::from_json_str("test", json).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.stations[0].name, "Station_1");
        assert_eq!(set.stations[1].name, "Station_2");
        assert_eq!(set.stations[1].slope, 80.0);
    }

    #[test]
    fn test_station_file_missing_field() {
        let json = r#"{"coordinates": [{"latitude": 48.85, "longitude": 2.35}]}"#;
        assert!(matches!(StationSet::from_json_str("test", json), Err(AcoError::Json(_))));
    }

    #[test]
    fn test_matrix_parsing() {
        let json = r#"{"name": "tiny", "names": ["A", "B"], "matrix": [[0, 3], [4, 0]]}"#;
        let matrix = DistanceMatrix::from_json_str("fallback", json).unwrap();

        assert_eq!(matrix.name, "tiny");
        assert_eq!(matrix.dimension(), 2);
        assert_eq!(matrix.names, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(matrix.costs[1][0], 4.0);
    }

    #[test]
    fn test_matrix_rejects_ragged_rows() {
        let result = DistanceMatrix::new("bad", vec![vec![0.0, 1.0], vec![1.0]]);
        assert!(matches!(result, Err(AcoError::InvalidInstance(_))));
    }

    #[test]
    fn test_matrix_rejects_name_mismatch() {
        let json = r#"{"names": ["A"], "matrix": [[0, 3], [4, 0]]}"#;
        assert!(matches!(
            DistanceMatrix::from_json_str("bad", json),
            Err(AcoError::InvalidInstance(_))
        ));
    }

    #[test]
    fn test_statistics() {
        let matrix = DistanceMatrix::new("stats", vec![
            vec![0.0, 2.0, 4.0],
            vec![2.0, 0.0, 6.0],
            vec![4.0, 6.0, 0.0],
        ]).unwrap();
        let provider = MatrixProvider::new(matrix);
        let stats = InstanceStatistics::collect("stats", &provider).unwrap();

        assert_eq!(stats.num_stations, 3);
        assert_eq!(stats.feasible_edges, 6);
        assert_eq!(stats.infeasible_edges, 0);
        assert!((stats.avg_cost - 4.0).abs() < 1e-10);
        assert_eq!(stats.max_cost, 6.0);
    }

    #[test]
    fn test_statistics_reject_broken_matrix() {
        let matrix = DistanceMatrix::new("broken", vec![
            vec![0.0, 2.0, f64::NAN],
            vec![2.0, 0.0, 6.0],
            vec![-4.0, 6.0, 0.0],
        ]).unwrap();
        let provider = MatrixProvider::new(matrix);

        assert!(matches!(
            InstanceStatistics::collect("broken", &provider),
            Err(AcoError::InvalidProviderResponse { from: 0, to: 2, .. })
        ));
    }
}
