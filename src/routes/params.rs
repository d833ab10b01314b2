use chrono::{Datelike, Days, NaiveDate};
use sea_orm::Order;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::{orders, payments, posts, products, promotions, users};

pub const DEFAULT_PER_PAGE: i64 = 15;
pub const MAX_PER_PAGE: i64 = 100;
/// Highest page whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

#[derive(Debug, Default, Clone, Copy)]
pub struct Pagination {
    /// Page number, default 1.
    pub page: Option<i64>,
    /// Items per page, default 15.
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// `(page, per_page, offset)` with the page clamped to `1..=MAX_PAGE`.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.limit.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Listings sort descending unless `desc=false` is passed.
    pub fn from_desc(desc: Option<bool>) -> Self {
        if desc.unwrap_or(true) {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn as_order(&self) -> Order {
        match self {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomySortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Slug,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Price,
}

impl ProductSortBy {
    pub fn column(&self) -> products::Column {
        match self {
            ProductSortBy::CreatedAt => products::Column::CreatedAt,
            ProductSortBy::UpdatedAt => products::Column::UpdatedAt,
            ProductSortBy::Title => products::Column::Title,
            ProductSortBy::Price => products::Column::Price,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Amount,
    DeliveryFee,
    ShippedAt,
}

impl OrderSortBy {
    pub fn column(&self) -> orders::Column {
        match self {
            OrderSortBy::CreatedAt => orders::Column::CreatedAt,
            OrderSortBy::UpdatedAt => orders::Column::UpdatedAt,
            OrderSortBy::Amount => orders::Column::Amount,
            OrderSortBy::DeliveryFee => orders::Column::DeliveryFee,
            OrderSortBy::ShippedAt => orders::Column::ShippedAt,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserSortBy {
    #[default]
    CreatedAt,
    FirstName,
    LastName,
    Email,
}

impl UserSortBy {
    pub fn column(&self) -> users::Column {
        match self {
            UserSortBy::CreatedAt => users::Column::CreatedAt,
            UserSortBy::FirstName => users::Column::FirstName,
            UserSortBy::LastName => users::Column::LastName,
            UserSortBy::Email => users::Column::Email,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Type,
}

impl PaymentSortBy {
    pub fn column(&self) -> payments::Column {
        match self {
            PaymentSortBy::CreatedAt => payments::Column::CreatedAt,
            PaymentSortBy::UpdatedAt => payments::Column::UpdatedAt,
            PaymentSortBy::Type => payments::Column::PaymentType,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentSortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

impl ContentSortBy {
    pub fn post_column(&self) -> posts::Column {
        match self {
            ContentSortBy::CreatedAt => posts::Column::CreatedAt,
            ContentSortBy::UpdatedAt => posts::Column::UpdatedAt,
            ContentSortBy::Title => posts::Column::Title,
        }
    }

    pub fn promotion_column(&self) -> promotions::Column {
        match self {
            ContentSortBy::CreatedAt => promotions::Column::CreatedAt,
            ContentSortBy::UpdatedAt => promotions::Column::UpdatedAt,
            ContentSortBy::Title => promotions::Column::Title,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<TaxonomySortBy>,
    /// Sort descending, default true.
    pub desc: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<ProductSortBy>,
    pub desc: Option<bool>,
    /// Substring of the title.
    pub title: Option<String>,
    /// Maximum price in minor units.
    pub price: Option<i64>,
    pub brand: Option<Uuid>,
    pub category: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<OrderSortBy>,
    pub desc: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListingQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<UserSortBy>,
    pub desc: Option<bool>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub marketing: Option<bool>,
    /// Registration date, `YYYY-MM-DD`.
    pub created_at: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<PaymentSortBy>,
    pub desc: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<ContentSortBy>,
    pub desc: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PromotionQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<ContentSortBy>,
    pub desc: Option<bool>,
    /// Only promotions running today, default true.
    pub valid: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FixRange {
    Today,
    Monthly,
    Yearly,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<OrderSortBy>,
    pub desc: Option<bool>,
    #[serde(rename = "dateRange[from]")]
    pub date_from: Option<NaiveDate>,
    #[serde(rename = "dateRange[to]")]
    pub date_to: Option<NaiveDate>,
    #[serde(rename = "fixRange")]
    pub fix_range: Option<FixRange>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShipmentLocatorQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<OrderSortBy>,
    pub desc: Option<bool>,
    #[serde(rename = "dateRange[from]")]
    pub date_from: Option<NaiveDate>,
    #[serde(rename = "dateRange[to]")]
    pub date_to: Option<NaiveDate>,
    #[serde(rename = "fixRange")]
    pub fix_range: Option<FixRange>,
    #[serde(rename = "orderUuid")]
    pub order_uuid: Option<Uuid>,
    #[serde(rename = "customerUuid")]
    pub customer_uuid: Option<Uuid>,
}

/// Inclusive day range applied to `created_at`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// A fixed range wins over explicit dates.
pub fn resolve_date_range(
    fix_range: Option<FixRange>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> DateRange {
    let Some(fix_range) = fix_range else {
        return DateRange { from, to };
    };

    let (from, to) = match fix_range {
        FixRange::Today => (Some(today), today.checked_add_days(Days::new(1))),
        FixRange::Monthly => {
            let first = today.with_day(1);
            let last = first
                .and_then(|d| d.checked_add_months(chrono::Months::new(1)))
                .and_then(|d| d.pred_opt());
            (first, last)
        }
        FixRange::Yearly => (
            NaiveDate::from_ymd_opt(today.year(), 1, 1),
            NaiveDate::from_ymd_opt(today.year(), 12, 31),
        ),
    };
    DateRange { from, to }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 15, 0));
        assert_eq!(Pagination::new(Some(3), Some(10)).normalize(), (3, 10, 20));
        assert_eq!(Pagination::new(Some(0), Some(0)).normalize(), (1, 1, 0));
        assert_eq!(Pagination::new(Some(-4), Some(5000)).normalize(), (1, 100, 0));
    }

    #[test]
    fn huge_page_numbers_do_not_overflow_the_offset() {
        let (page, per_page, offset) = Pagination::new(Some(i64::MAX), Some(15)).normalize();
        assert_eq!(page, MAX_PAGE);
        assert_eq!(per_page, 15);
        assert_eq!(offset, (MAX_PAGE - 1) * 15);

        let (_, _, offset) = Pagination::new(Some(i64::MAX), Some(i64::MAX)).normalize();
        assert_eq!(offset, (MAX_PAGE - 1) * MAX_PER_PAGE);
    }

    #[test]
    fn listings_sort_descending_by_default() {
        assert_eq!(SortOrder::from_desc(None), SortOrder::Desc);
        assert_eq!(SortOrder::from_desc(Some(true)), SortOrder::Desc);
        assert_eq!(SortOrder::from_desc(Some(false)), SortOrder::Asc);
    }

    #[test]
    fn explicit_dates_pass_through_without_fix_range() {
        let range = resolve_date_range(None, Some(date(2024, 1, 2)), None, date(2024, 6, 1));
        assert_eq!(range.from, Some(date(2024, 1, 2)));
        assert_eq!(range.to, None);
    }

    #[test]
    fn today_spans_to_tomorrow() {
        let range = resolve_date_range(Some(FixRange::Today), None, None, date(2024, 12, 31));
        assert_eq!(range.from, Some(date(2024, 12, 31)));
        assert_eq!(range.to, Some(date(2025, 1, 1)));
    }

    #[test]
    fn monthly_covers_the_calendar_month() {
        let range = resolve_date_range(
            Some(FixRange::Monthly),
            Some(date(2020, 1, 1)),
            Some(date(2020, 1, 2)),
            date(2024, 2, 17),
        );
        assert_eq!(range.from, Some(date(2024, 2, 1)));
        assert_eq!(range.to, Some(date(2024, 2, 29)));

        let december = resolve_date_range(Some(FixRange::Monthly), None, None, date(2023, 12, 5));
        assert_eq!(december.to, Some(date(2023, 12, 31)));
    }

    #[test]
    fn yearly_covers_the_calendar_year() {
        let range = resolve_date_range(Some(FixRange::Yearly), None, None, date(2023, 7, 14));
        assert_eq!(range.from, Some(date(2023, 1, 1)));
        assert_eq!(range.to, Some(date(2023, 12, 31)));
    }

    #[test]
    fn dashboard_query_reads_bracketed_keys() {
        let query: DashboardQuery = parse_query(
            "dateRange%5Bfrom%5D=2024-01-01&dateRange%5Bto%5D=2024-01-31&fixRange=monthly&desc=false&page=2",
        );
        assert_eq!(query.date_from, Some(date(2024, 1, 1)));
        assert_eq!(query.date_to, Some(date(2024, 1, 31)));
        assert_eq!(query.fix_range, Some(FixRange::Monthly));
        assert_eq!(query.desc, Some(false));
        assert_eq!(query.page, Some(2));
    }

    fn parse_query<T: serde::de::DeserializeOwned>(raw: &str) -> T {
        let uri: axum::http::Uri = format!("/orders/dashboard?{raw}").parse().unwrap();
        axum::extract::Query::<T>::try_from_uri(&uri).unwrap().0
    }
}
