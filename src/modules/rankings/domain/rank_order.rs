use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::shared::errors::{AppError, AppResult};

/// Ranking inputs of one item taken from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankCandidate {
    pub item_id: Uuid,
    pub bayesian_rating: f64,
    pub review_count: u32,
}

/// Strict total order: Bayesian rating desc, review count desc, identity asc.
pub fn compare_candidates(a: &RankCandidate, b: &RankCandidate) -> Ordering {
    b.bayesian_rating
        .total_cmp(&a.bayesian_rating)
        .then_with(|| b.review_count.cmp(&a.review_count))
        .then_with(|| a.item_id.cmp(&b.item_id))
}

/// Order rated candidates; unrated ones are dropped and receive no position.
///
/// Non-finite ratings or duplicate identities abort the whole computation so a
/// half-valid ordering is never produced.
pub fn order_candidates(mut candidates: Vec<RankCandidate>) -> AppResult<Vec<Uuid>> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in &candidates {
        if !candidate.bayesian_rating.is_finite() {
            return Err(AppError::ReassignmentFailed(format!(
                "item {} has a non-finite bayesian rating",
                candidate.item_id
            )));
        }
        if !seen.insert(candidate.item_id) {
            return Err(AppError::ReassignmentFailed(format!(
                "item {} appears twice in the snapshot",
                candidate.item_id
            )));
        }
    }

    candidates.retain(|c| c.review_count >= 1);
    candidates.sort_by(compare_candidates);

    Ok(candidates.into_iter().map(|c| c.item_id).collect())
}

/// An immutable, fully computed set of rank positions.
///
/// Positions are dense and start at 1. A table is only ever replaced as a
/// whole, so readers observe one generation or the next, never a mix.
#[derive(Debug, Clone)]
pub struct RankTable {
    generation: u64,
    computed_at: DateTime<Utc>,
    ordered: Vec<Uuid>,
    positions: HashMap<Uuid, u32>,
}

impl RankTable {
    pub fn empty() -> Self {
        Self {
            generation: 0,
            computed_at: Utc::now(),
            ordered: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Build a table from identities already in rank order.
    pub fn from_ordered(generation: u64, ordered: Vec<Uuid>) -> AppResult<Self> {
        Self::restore(generation, Utc::now(), ordered)
    }

    /// Rebuild a previously published table (e.g. read back from storage).
    pub fn restore(generation: u64, computed_at: DateTime<Utc>, ordered: Vec<Uuid>) -> AppResult<Self> {
        let mut positions = HashMap::with_capacity(ordered.len());
        for (index, id) in ordered.iter().enumerate() {
            let position = u32::try_from(index + 1).map_err(|_| {
                AppError::ReassignmentFailed("too many ranked items".to_string())
            })?;
            if positions.insert(*id, position).is_some() {
                return Err(AppError::ReassignmentFailed(format!(
                    "item {} ranked twice",
                    id
                )));
            }
        }

        Ok(Self {
            generation,
            computed_at,
            ordered,
            positions,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }

    pub fn position(&self, item_id: &Uuid) -> Option<u32> {
        self.positions.get(item_id).copied()
    }

    /// Ranked identities, best first
    pub fn ordered_ids(&self) -> &[Uuid] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u128, bayesian: f64, count: u32) -> RankCandidate {
        RankCandidate {
            item_id: Uuid::from_u128(id),
            bayesian_rating: bayesian,
            review_count: count,
        }
    }

    #[test]
    fn orders_by_bayesian_then_count_then_identity() {
        let ordered = order_candidates(vec![
            candidate(1, 7.0, 3),
            candidate(2, 8.0, 1),
            candidate(3, 7.0, 9),
            candidate(4, 7.0, 3),
        ])
        .unwrap();

        assert_eq!(
            ordered,
            vec![
                Uuid::from_u128(2),
                Uuid::from_u128(3),
                Uuid::from_u128(1),
                Uuid::from_u128(4),
            ]
        );
    }

    #[test]
    fn exact_ties_resolve_by_identity_regardless_of_input_order() {
        let forward = order_candidates(vec![candidate(9, 6.0, 2), candidate(5, 6.0, 2)]).unwrap();
        let backward = order_candidates(vec![candidate(5, 6.0, 2), candidate(9, 6.0, 2)]).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward[0], Uuid::from_u128(5));
    }

    #[test]
    fn unrated_candidates_get_no_position() {
        let ordered = order_candidates(vec![candidate(1, 9.9, 0), candidate(2, 5.0, 1)]).unwrap();
        assert_eq!(ordered, vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn rejects_non_finite_ratings_and_duplicates() {
        assert!(order_candidates(vec![candidate(1, f64::NAN, 2)]).is_err());
        assert!(order_candidates(vec![candidate(1, 7.0, 2), candidate(1, 6.0, 3)]).is_err());
    }

    #[test]
    fn table_positions_are_dense_from_one() {
        let ids: Vec<Uuid> = (1..=4).map(Uuid::from_u128).collect();
        let table = RankTable::from_ordered(3, ids.clone()).unwrap();

        assert_eq!(table.generation(), 3);
        assert_eq!(table.len(), 4);
        for (index, id) in ids.iter().enumerate() {
            assert_eq!(table.position(id), Some(index as u32 + 1));
        }
        assert_eq!(table.position(&Uuid::from_u128(99)), None);
    }
}
