use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub email: String,
    pub email_verified_at: Option<DateTimeWithTimeZone>,
    pub password_hash: String,
    pub avatar: Option<Uuid>,
    pub address: String,
    pub phone_number: String,
    pub is_marketing: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_many = "super::jwt_tokens::Entity")]
    JwtTokens,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::jwt_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JwtTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
