use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};
use tracing::info;

use crate::db::entities::subscription;

/// Creates the `subscriptions` table and its indexes when they are missing.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_table = schema.create_table_from_entity(subscription::Entity);
    create_table.if_not_exists();
    db.execute(backend.build(&create_table)).await?;

    for mut create_index in schema.create_index_from_entity(subscription::Entity) {
        create_index.if_not_exists();
        db.execute(backend.build(&create_index)).await?;
    }

    info!("Subscription schema is ready.");
    Ok(())
}
