use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::batch_update;
use crate::errors::ServiceError;

pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Accepted events of one batch, ordered by (timestamp, sequence).
///
/// Rows are fetched a page at a time as the stream is polled. Every call to
/// [`EventSequence::stream`] starts again from the first event.
#[derive(Clone)]
pub struct EventSequence {
    db: Arc<DbPool>,
    batch_id: Uuid,
    page_size: u64,
}

impl EventSequence {
    pub fn new(db: Arc<DbPool>, batch_id: Uuid) -> Self {
        Self {
            db,
            batch_id,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn stream(&self) -> impl Stream<Item = Result<batch_update::Model, ServiceError>> + Send + 'static {
        let db = self.db.clone();
        let batch_id = self.batch_id;
        let page_size = self.page_size;

        stream::try_unfold(Some(0u64), move |cursor| {
            let db = db.clone();
            async move {
                let Some(page) = cursor else {
                    return Ok(None);
                };
                let rows = batch_update::Entity::find()
                    .filter(batch_update::Column::BatchId.eq(batch_id))
                    .order_by_asc(batch_update::Column::Timestamp)
                    .order_by_asc(batch_update::Column::Sequence)
                    .offset(page * page_size)
                    .limit(page_size)
                    .all(&*db)
                    .await?;
                let next = if (rows.len() as u64) < page_size {
                    None
                } else {
                    Some(page + 1)
                };
                Ok::<_, ServiceError>(Some((rows, next)))
            }
        })
        .map_ok(|rows| stream::iter(rows.into_iter().map(Ok)))
        .try_flatten()
    }

    pub async fn collect(&self) -> Result<Vec<batch_update::Model>, ServiceError> {
        self.stream().try_collect().await
    }

    /// First `n` events without fetching the rest.
    pub async fn take(&self, n: usize) -> Result<Vec<batch_update::Model>, ServiceError> {
        self.stream().take(n).try_collect().await
    }
}
