use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entities::image::Entity as Image;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: Category,
    pub price: f32,
    pub image_id: i32,
    #[sea_orm(default = false)]
    pub is_best_seller: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Image",
        from = "crate::entities::product::Column::ImageId",
        to = "crate::entities::image::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Image,
}

impl Related<crate::entities::image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Image.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    enum_name = "category_enum",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[sea_orm(string_value = "starters")]
    Starters,
    #[sea_orm(string_value = "mains")]
    Mains,
    #[sea_orm(string_value = "desserts")]
    Desserts,
    #[sea_orm(string_value = "beverages")]
    Beverages,
    #[sea_orm(string_value = "snacks")]
    Snacks,
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starters" => Ok(Self::Starters),
            "mains" => Ok(Self::Mains),
            "desserts" => Ok(Self::Desserts),
            "beverages" => Ok(Self::Beverages),
            "snacks" => Ok(Self::Snacks),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}
