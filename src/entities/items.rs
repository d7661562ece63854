//! SeaORM Entity for Grand Exchange items
//!
//! Static catalog data ingested from the upstream mapping feed.
//! Rows are upserted by feed id and never deleted in normal operation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Feed-assigned item id, used as the primary key directly
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    /// Flavor text shown on examine
    pub examine: Option<String>,
    pub members: bool,
    pub lowalch: Option<i32>,
    pub highalch: Option<i32>,
    /// Grand Exchange buy limit (feed field `limit`)
    pub limit_value: Option<i32>,
    pub value: Option<i32>,
    pub icon: Option<String>,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::prices::Entity")]
    Prices,
}

impl Related<super::prices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
