use crate::error::AcoResult;
use crate::provider::{checked_cost, EdgeProvider};
use crate::solution::Solution;
use ordered_float::OrderedFloat;

pub trait ConstructionHeuristic {
    fn construct(&self, provider: &dyn EdgeProvider) -> AcoResult<Solution>;
    fn name(&self) -> &str;
}

/// Feasibility-aware Nearest Neighbor Heuristic
///
/// Builds an open path by repeatedly moving to the nearest unvisited station
/// reachable over a feasible edge. When none is reachable it takes the
/// nearest unvisited station regardless of feasibility.
pub struct NearestNeighborHeuristic {
    pub start: usize,
}

impl NearestNeighborHeuristic {
    pub fn new() -> Self {
        NearestNeighborHeuristic { start: 0 }
    }

    pub fn from_start(start: usize) -> Self {
        NearestNeighborHeuristic { start }
    }

    fn find_nearest(
        &self,
        provider: &dyn EdgeProvider,
        current: usize,
        unvisited: &[usize],
    ) -> AcoResult<Option<usize>> {
        let mut feasible: Option<(usize, f64)> = None;
        let mut any: Option<(usize, f64)> = None;

        for &station in unvisited {
            let cost = checked_cost(provider, current, station)?;
            let closer = |best: Option<(usize, f64)>| best.map_or(true, |(_, c)| OrderedFloat(cost) < OrderedFloat(c));

            if provider.feasible(current, station) && closer(feasible) {
                feasible = Some((station, cost));
            }
            if closer(any) {
                any = Some((station, cost));
            }
        }

        Ok(feasible.or(any).map(|(station, _)| station))
    }

    /// Tour starting from `self.start`
    pub fn build_tour(&self, provider: &dyn EdgeProvider) -> AcoResult<Vec<usize>> {
        let n = provider.num_stations();
        if n == 0 {
            return Ok(Vec::new());
        }

        let start = self.start.min(n - 1);
        let mut tour = vec![start];
        let mut unvisited: Vec<usize> = (0..n).filter(|&s| s != start).collect();
        let mut current = start;

        while let Some(next) = self.find_nearest(provider, current, &unvisited)? {
            unvisited.retain(|&s| s != next);
            tour.push(next);
            current = next;
        }

        Ok(tour)
    }
}

impl Default for NearestNeighborHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for NearestNeighborHeuristic {
    fn construct(&self, provider: &dyn EdgeProvider) -> AcoResult<Solution> {
        let start = std::time::Instant::now();
        let tour = self.build_tour(provider)?;
        let mut solution = Solution::from_tour(provider, tour, self.name())?;
        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }

    fn name(&self) -> &str {
        "NearestNeighbor"
    }
}

/// Nearest Neighbor from every start station, keeping the cheapest path
pub struct MultiStartNearestNeighbor;

impl MultiStartNearestNeighbor {
    pub fn new() -> Self {
        MultiStartNearestNeighbor
    }

    /// One nearest-neighbor solution per start station
    pub fn all_starts(&self, provider: &dyn EdgeProvider) -> AcoResult<Vec<Solution>> {
        (0..provider.num_stations())
            .map(|s| NearestNeighborHeuristic::from_start(s).construct(provider))
            .collect()
    }
}

impl Default for MultiStartNearestNeighbor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for MultiStartNearestNeighbor {
    fn construct(&self, provider: &dyn EdgeProvider) -> AcoResult<Solution> {
        let start = std::time::Instant::now();

        let mut best = Solution::from_tour(provider, Vec::new(), self.name())?;
        for candidate in self.all_starts(provider)? {
            if best.tour.is_empty() || candidate.cost < best.cost {
                best = candidate;
            }
        }

        best.algorithm = self.name().to_string();
        best.computation_time = start.elapsed().as_secs_f64();
        Ok(best)
    }

    fn name(&self) -> &str {
        "MultiStartNearestNeighbor"
    }
}
