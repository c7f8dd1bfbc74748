//! Transaction entity

use sea_orm::entity::prelude::*;

use crate::domain::Transaction;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub hash: String,

    pub block_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub time: DateTimeUtc,

    /// BTC
    pub output_total: Decimal,

    pub output_total_usd: Decimal,

    /// BTC
    pub fee: Decimal,

    /// Bytes
    pub size: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transaction {
    fn from(m: Model) -> Self {
        Self {
            hash: m.hash,
            block_id: m.block_id,
            time: m.time,
            output_total: m.output_total,
            output_total_usd: m.output_total_usd,
            fee: m.fee,
            size: m.size,
        }
    }
}
