//! Tour construction for a single ant.

use crate::error::AcoResult;
use crate::heuristics::aco::pheromone::PheromoneMatrix;
use crate::heuristics::aco::AcoConfig;
use crate::provider::{checked_cost, EdgeProvider};
use ordered_float::OrderedFloat;
use rand::prelude::*;
use std::cmp::Reverse;

/// Walk the cumulative weights and return the first item whose running sum
/// reaches `draw`. Falls back to the last item when rounding leaves the sum
/// just short of the draw.
pub fn roulette_select(candidates: &[(usize, f64)], draw: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    for &(item, weight) in candidates {
        cumulative += weight;
        if cumulative >= draw {
            return Some(item);
        }
    }
    candidates.last().map(|&(item, _)| item)
}

/// Builds tours from a read-only view of the pheromone trails
pub struct PathConstructor<'a> {
    provider: &'a dyn EdgeProvider,
    pheromone: &'a PheromoneMatrix,
    alpha: f64,
    beta: f64,
    epsilon: f64,
}

impl<'a> PathConstructor<'a> {
    pub fn new(provider: &'a dyn EdgeProvider, pheromone: &'a PheromoneMatrix, config: &AcoConfig) -> Self {
        PathConstructor {
            provider,
            pheromone,
            alpha: config.alpha,
            beta: config.beta,
            epsilon: config.epsilon,
        }
    }

    /// Construct a complete open tour for one ant
    pub fn construct<R: Rng + ?Sized>(&self, rng: &mut R) -> AcoResult<Vec<usize>> {
        let n = self.provider.num_stations();
        if n == 0 {
            return Ok(Vec::new());
        }

        let start = rng.gen_range(0..n);
        let mut tour = Vec::with_capacity(n);
        tour.push(start);

        // Kept in station order: candidate order drives the roulette walk
        let mut unvisited: Vec<usize> = (0..n).filter(|&s| s != start).collect();
        let mut current = start;

        while !unvisited.is_empty() {
            let pos = self.select_next(current, &unvisited, rng)?;
            current = unvisited.remove(pos);
            tour.push(current);
        }

        Ok(tour)
    }

    /// Attractiveness of the edge `from -> to`
    #[inline]
    fn weight(&self, from: usize, to: usize, cost: f64) -> f64 {
        let tau = self.pheromone.get(from, to).powf(self.alpha);
        let eta = (1.0 / (cost + self.epsilon)).powf(self.beta);
        let weight = tau * eta;
        if weight.is_nan() {
            0.0
        } else {
            weight
        }
    }

    /// Pick the next station; returns its position in `unvisited`.
    ///
    /// Infeasible edges are left out of the roulette entirely. When no
    /// feasible edge carries weight the ant picks uniformly among all
    /// unvisited stations so that the tour always completes.
    pub fn select_next<R: Rng + ?Sized>(&self, current: usize, unvisited: &[usize], rng: &mut R) -> AcoResult<usize> {
        let mut candidates: Vec<(usize, f64)> = Vec::with_capacity(unvisited.len());
        let mut total = 0.0;

        for (pos, &station) in unvisited.iter().enumerate() {
            if !self.provider.feasible(current, station) {
                continue;
            }
            let cost = checked_cost(self.provider, current, station)?;
            let weight = self.weight(current, station, cost);
            total += weight;
            candidates.push((pos, weight));
        }

        if total > 0.0 && total.is_finite() {
            let draw = rng.gen::<f64>() * total;
            if let Some(pos) = roulette_select(&candidates, draw) {
                return Ok(pos);
            }
        } else if total == f64::INFINITY {
            // Overflowed weights dominate; take the first heaviest candidate
            if let Some(&(pos, _)) = candidates
                .iter()
                .min_by_key(|&&(_, w)| Reverse(OrderedFloat(w)))
            {
                return Ok(pos);
            }
        }

        log::trace!("no weighted candidate from station {}, falling back to uniform choice", current);
        Ok(rng.gen_range(0..unvisited.len()))
    }
}
