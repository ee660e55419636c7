use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_id: String,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub package_id: Option<Uuid>,
    pub is_custom_order: bool,
    pub delivery_date_and_time: DateTimeWithTimeZone,
    pub is_setup: bool,
    pub setup_duration: Option<String>,
    pub setup_start_date_and_time: Option<DateTimeWithTimeZone>,
    pub amount: Option<f64>,
    pub offered_amount: Option<f64>,
    pub delivery_fee: f64,
    pub setup_fee: f64,
    pub is_instant_transfer: bool,
    pub status: String,
    pub payment_status: String,
    pub delivery_decline_message: Option<String>,
    pub delivery_longitude: f64,
    pub delivery_latitude: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id"
    )]
    Vendors,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::packages::Entity",
        from = "Column::PackageId",
        to = "super::packages::Column::Id"
    )]
    Packages,
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::packages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Packages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
