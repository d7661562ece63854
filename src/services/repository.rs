//! Persistence gateway for items and prices
//!
//! All access to the durable store goes through `ItemRepository`. Each
//! method is its own transaction scope; concurrent calls are safe on
//! SeaORM's pooled connection. The SeaORM implementation is the only
//! production one; tests drive the update cycle with an in-memory stand-in.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, QueryOrder, QuerySelect, Set,
};
use std::collections::{HashMap, HashSet};

use crate::entities::{items, prices};
use crate::models::item::ItemWithPrice;
use crate::services::feed::{ItemMapping, PriceQuote};

/// Narrow projection of a stored price row, just enough to diff against
/// a feed snapshot without pulling full item rows
#[derive(Debug, Clone, Default, FromQueryResult)]
pub struct CurrentPrice {
    pub item_id: i32,
    pub high_price: Option<i64>,
    pub high_time: Option<i64>,
    pub low_price: Option<i64>,
    pub low_time: Option<i64>,
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Batch insert-or-update catalog entries by id. Every non-key field
    /// is overwritten and `updated_at` is stamped.
    async fn upsert_items(
        &self,
        mappings: Vec<ItemMapping>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// All items left-joined with their price row, ordered by name.
    /// Canonical read path for client-facing queries.
    async fn all_with_prices(
        &self,
    ) -> Result<Vec<ItemWithPrice>, Box<dyn std::error::Error + Send + Sync>>;

    async fn one_with_price(
        &self,
        id: i32,
    ) -> Result<Option<ItemWithPrice>, Box<dyn std::error::Error + Send + Sync>>;

    /// Current prices keyed by item id, narrow projection for diffing
    async fn current_prices(
        &self,
    ) -> Result<HashMap<i32, CurrentPrice>, Box<dyn std::error::Error + Send + Sync>>;

    /// Ids of all known items, used to filter feed rows that reference
    /// items outside the tracked catalog
    async fn valid_item_ids(
        &self,
    ) -> Result<HashSet<i32>, Box<dyn std::error::Error + Send + Sync>>;

    /// Batch upsert of exactly the changed price rows; stamps
    /// `last_updated` to now
    async fn apply_price_updates(
        &self,
        changes: &HashMap<i32, PriceQuote>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Clone)]
pub struct SeaOrmItemRepository {
    db: DatabaseConnection,
}

impl SeaOrmItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn join_to_item_with_price(item: items::Model, price: Option<prices::Model>) -> ItemWithPrice {
    let price = price.unwrap_or(prices::Model {
        item_id: item.id,
        high_price: None,
        high_time: None,
        low_price: None,
        low_time: None,
        last_updated: None,
    });

    ItemWithPrice {
        id: item.id,
        name: item.name,
        examine: item.examine,
        members: item.members,
        lowalch: item.lowalch,
        highalch: item.highalch,
        limit_value: item.limit_value,
        value: item.value,
        icon: item.icon,
        high_price: price.high_price,
        high_time: price.high_time,
        low_price: price.low_price,
        low_time: price.low_time,
        price_last_updated: price.last_updated.map(|t| t.to_utc()),
    }
}

#[async_trait]
impl ItemRepository for SeaOrmItemRepository {
    async fn upsert_items(
        &self,
        mappings: Vec<ItemMapping>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if mappings.is_empty() {
            return Ok(());
        }

        let now = Utc::now().fixed_offset();
        let models: Vec<items::ActiveModel> = mappings
            .into_iter()
            .map(|m| items::ActiveModel {
                id: Set(m.id),
                name: Set(m.name),
                examine: Set(m.examine),
                members: Set(m.members),
                lowalch: Set(m.lowalch),
                highalch: Set(m.highalch),
                limit_value: Set(m.limit_value),
                value: Set(m.value),
                icon: Set(m.icon),
                updated_at: Set(Some(now)),
            })
            .collect();

        items::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(items::Column::Id)
                    .update_columns([
                        items::Column::Name,
                        items::Column::Examine,
                        items::Column::Members,
                        items::Column::Lowalch,
                        items::Column::Highalch,
                        items::Column::LimitValue,
                        items::Column::Value,
                        items::Column::Icon,
                        items::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn all_with_prices(
        &self,
    ) -> Result<Vec<ItemWithPrice>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = items::Entity::find()
            .find_also_related(prices::Entity)
            .order_by_asc(items::Column::Name)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(item, price)| join_to_item_with_price(item, price))
            .collect())
    }

    async fn one_with_price(
        &self,
        id: i32,
    ) -> Result<Option<ItemWithPrice>, Box<dyn std::error::Error + Send + Sync>> {
        let row = items::Entity::find_by_id(id)
            .find_also_related(prices::Entity)
            .one(&self.db)
            .await?;

        Ok(row.map(|(item, price)| join_to_item_with_price(item, price)))
    }

    async fn current_prices(
        &self,
    ) -> Result<HashMap<i32, CurrentPrice>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<CurrentPrice> = prices::Entity::find()
            .select_only()
            .columns([
                prices::Column::ItemId,
                prices::Column::HighPrice,
                prices::Column::HighTime,
                prices::Column::LowPrice,
                prices::Column::LowTime,
            ])
            .into_model::<CurrentPrice>()
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|r| (r.item_id, r)).collect())
    }

    async fn valid_item_ids(
        &self,
    ) -> Result<HashSet<i32>, Box<dyn std::error::Error + Send + Sync>> {
        let ids: Vec<i32> = items::Entity::find()
            .select_only()
            .column(items::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn apply_price_updates(
        &self,
        changes: &HashMap<i32, PriceQuote>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if changes.is_empty() {
            return Ok(());
        }

        let now = Utc::now().fixed_offset();
        let models: Vec<prices::ActiveModel> = changes
            .iter()
            .map(|(item_id, quote)| prices::ActiveModel {
                item_id: Set(*item_id),
                high_price: Set(quote.high),
                high_time: Set(quote.high_time),
                low_price: Set(quote.low),
                low_time: Set(quote.low_time),
                last_updated: Set(Some(now)),
            })
            .collect();

        prices::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(prices::Column::ItemId)
                    .update_columns([
                        prices::Column::HighPrice,
                        prices::Column::HighTime,
                        prices::Column::LowPrice,
                        prices::Column::LowTime,
                        prices::Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
