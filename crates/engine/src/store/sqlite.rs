//! Ledger kept in SQLite through sea-orm.
//!
//! The schema is owned by the `migration` crate. The header row does not
//! exist as data here; it is synthesised on read so every backend returns the
//! same shape.

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveValue, Database, DatabaseConnection, QueryOrder, entity::prelude::*};

use crate::{LedgerStore, ResultLedger, Row, transactions};

mod ledger_rows {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "ledger_rows")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub date: String,
        pub kind: String,
        pub amount: String,
        pub description: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    database: DatabaseConnection,
}

impl SqliteStore {
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Connects to `url` (e.g. `sqlite:catat.db?mode=rwc`).
    pub async fn connect(url: &str) -> ResultLedger<Self> {
        let database = Database::connect(url).await?;
        Ok(Self::new(database))
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn ensure_schema(&self) -> ResultLedger<()> {
        Migrator::up(&self.database, None).await?;
        Ok(())
    }

    async fn append_row(&self, row: Row) -> ResultLedger<()> {
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
        let model = ledger_rows::ActiveModel {
            id: ActiveValue::NotSet,
            date: ActiveValue::Set(cell(0)),
            kind: ActiveValue::Set(cell(1)),
            amount: ActiveValue::Set(cell(2)),
            description: ActiveValue::Set(cell(3)),
        };
        model.insert(&self.database).await?;
        Ok(())
    }

    async fn read_all_rows(&self) -> ResultLedger<Vec<Row>> {
        let models = ledger_rows::Entity::find()
            .order_by_asc(ledger_rows::Column::Id)
            .all(&self.database)
            .await?;

        let mut rows = Vec::with_capacity(models.len() + 1);
        rows.push(transactions::header_row());
        rows.extend(
            models
                .into_iter()
                .map(|model| vec![model.date, model.kind, model.amount, model.description]),
        );
        Ok(rows)
    }
}
