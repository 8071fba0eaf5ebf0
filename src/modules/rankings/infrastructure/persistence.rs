use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::log_debug;
use crate::modules::rankings::domain::{RankCandidate, RankStore, RankTable};
use crate::schema::{item_ranks, items, rank_generations};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

/// Rows per INSERT; keeps bind parameters well under the PostgreSQL limit
const INSERT_CHUNK: usize = 5_000;

/// Rank table persisted in `item_ranks`, replaced inside a single transaction.
///
/// The last loaded table is kept in memory and reloaded only when another
/// generation has been committed.
pub struct RankStoreImpl {
    db: Database,
    cached: RwLock<Arc<RankTable>>,
}

impl RankStoreImpl {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            cached: RwLock::new(Arc::new(RankTable::empty())),
        }
    }
}

#[async_trait]
impl RankStore for RankStoreImpl {
    async fn rank_candidates(&self) -> AppResult<Vec<RankCandidate>> {
        self.db
            .run(|conn| {
                let rows = conn
                    .build_transaction()
                    .repeatable_read()
                    .read_only()
                    .run(|conn| {
                        items::table
                            .select((items::id, items::bayesian_rating, items::review_count))
                            .load::<(Uuid, f64, i32)>(conn)
                    })?;

                Ok(rows
                    .into_iter()
                    .map(|(item_id, bayesian_rating, review_count)| RankCandidate {
                        item_id,
                        bayesian_rating,
                        review_count: u32::try_from(review_count).unwrap_or(0),
                    })
                    .collect())
            })
            .await
    }

    async fn publish(&self, table: RankTable) -> AppResult<()> {
        let generation = i64::try_from(table.generation())
            .map_err(|_| AppError::ReassignmentFailed("generation overflow".to_string()))?;
        let computed_at = table.computed_at();
        let rows: Vec<(Uuid, i32)> = table
            .ordered_ids()
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index as i32 + 1))
            .collect();

        self.db
            .run(move |conn| {
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    diesel::delete(item_ranks::table).execute(conn)?;
                    for chunk in rows.chunks(INSERT_CHUNK) {
                        let values: Vec<_> = chunk
                            .iter()
                            .map(|(id, position)| {
                                (
                                    item_ranks::item_id.eq(*id),
                                    item_ranks::rank_position.eq(*position),
                                )
                            })
                            .collect();
                        diesel::insert_into(item_ranks::table)
                            .values(&values)
                            .execute(conn)?;
                    }
                    diesel::delete(rank_generations::table).execute(conn)?;
                    diesel::insert_into(rank_generations::table)
                        .values((
                            rank_generations::generation.eq(generation),
                            rank_generations::computed_at.eq(computed_at),
                        ))
                        .execute(conn)?;
                    Ok(())
                })?;
                Ok(())
            })
            .await?;

        *self.cached.write().await = Arc::new(table);
        Ok(())
    }

    async fn current(&self) -> AppResult<Arc<RankTable>> {
        let cached = self.cached.read().await.clone();
        let cached_generation = i64::try_from(cached.generation()).unwrap_or(i64::MAX);

        let loaded = self
            .db
            .run(move |conn| {
                conn.build_transaction()
                    .repeatable_read()
                    .read_only()
                    .run(|conn| {
                        let head: Option<(i64, DateTime<Utc>)> = rank_generations::table
                            .select((rank_generations::generation, rank_generations::computed_at))
                            .order(rank_generations::generation.desc())
                            .first(conn)
                            .optional()?;

                        match head {
                            Some((generation, computed_at)) if generation != cached_generation => {
                                let ordered = item_ranks::table
                                    .order(item_ranks::rank_position.asc())
                                    .select(item_ranks::item_id)
                                    .load::<Uuid>(conn)?;
                                Ok(Some((generation, computed_at, ordered)))
                            }
                            _ => Ok::<_, diesel::result::Error>(None),
                        }
                    })
                    .map_err(AppError::from)
            })
            .await?;

        let Some((generation, computed_at, ordered)) = loaded else {
            return Ok(cached);
        };

        log_debug!(generation, "Loaded rank table from database");
        let table = Arc::new(RankTable::restore(
            u64::try_from(generation).unwrap_or(0),
            computed_at,
            ordered,
        )?);
        *self.cached.write().await = table.clone();
        Ok(table)
    }
}
