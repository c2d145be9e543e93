pub mod address;
pub mod cart_item;
pub mod feedback;
pub mod image;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;
pub mod wishlist_item;

use sea_orm::sea_query::Index;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema, Set,
};
use std::sync::Arc;

use crate::config::Config;
use crate::entities::{
    address::Entity as Address, cart_item::Entity as CartItem, feedback::Entity as Feedback,
    image::Entity as Image, order::Entity as Order, order_item::Entity as OrderItem,
    product::Entity as Product, user::Entity as User, wishlist_item::Entity as WishlistItem,
};

pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Address),
        schema.create_table_from_entity(Image),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(CartItem),
        schema.create_table_from_entity(WishlistItem),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
        schema.create_table_from_entity(Feedback),
    ];
    for statement in &mut statements {
        db.execute(backend.build(statement.if_not_exists())).await?;
    }

    // One feedback record per (user, order, product).
    let feedback_unique = Index::create()
        .name("idx_feedback_user_order_product")
        .table(Feedback)
        .col(feedback::Column::UserId)
        .col(feedback::Column::OrderId)
        .col(feedback::Column::ProductId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&feedback_unique)).await?;

    Ok(())
}

/// Ensures an administrator account exists so the console is reachable on a
/// fresh database.
pub async fn seed_admin(db: Arc<DatabaseConnection>, config: &Config) -> Result<(), DbErr> {
    let existing = User::find()
        .filter(user::Column::Username.eq("admin"))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash = user::hash_password(&config.admin_password)
        .map_err(|err| DbErr::Custom(format!("Failed to hash admin password: {err}")))?;

    let admin = user::ActiveModel {
        username: Set("admin".to_owned()),
        email: Set("admin@feastly.local".to_owned()),
        password: Set(password_hash),
        contact: Set("0000000000".to_owned()),
        is_admin: Set(true),
        ..Default::default()
    };
    User::insert(admin).exec(&*db).await?;
    tracing::info!("seeded default admin account");

    Ok(())
}
