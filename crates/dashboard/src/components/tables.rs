//! Per-entity table factories.
//!
//! Column keys are the sort/filter field names the list endpoints accept, so
//! a sortable column here always has a matching entry in the entity's
//! `ListSpec`. Admin mode adds the owning shop column and admin-only actions.

use bazaar_core::{DiscountType, Mode, OrderStatus, PaymentStatus, TransactionStatus, UserRole, VendorStatus};

use super::data_table::{
    BulkAction, ColumnKind, DataTableConfig, FilterOption, RowAction, TableColumn, TableFilter,
};

fn values<T: Copy>(all: &[T], as_str: fn(T) -> &'static str) -> Vec<FilterOption> {
    FilterOption::from_values(all.iter().map(|v| as_str(*v)))
}

fn shop_column() -> TableColumn {
    TableColumn::sortable("shopName", "Shop")
}

fn active_column() -> TableColumn {
    TableColumn::sortable("isActive", "Active").kind(ColumnKind::Boolean)
}

fn created_column() -> TableColumn {
    TableColumn::sortable("createdAt", "Created")
        .kind(ColumnKind::Date)
        .visible(false)
}

/// Edit, toggle `is_active`, delete.
fn crud_actions(config: DataTableConfig) -> DataTableConfig {
    config
        .row_action(RowAction::edit())
        .row_action(RowAction::toggle("Toggle active"))
        .row_action(RowAction::delete())
}

/// Build the shops table configuration.
#[must_use]
pub fn shops_table(mode: Mode) -> DataTableConfig {
    let admin = mode.is_admin();
    DataTableConfig::new("shops")
        .column(TableColumn::new("logoUrl", "").kind(ColumnKind::Image))
        .column(TableColumn::sortable("name", "Shop"))
        .column(TableColumn::sortable("slug", "Slug").visible(false))
        .column_if(admin, TableColumn::sortable("vendorName", "Vendor"))
        .column(TableColumn::new("productCount", "Products").kind(ColumnKind::Number))
        .column(active_column())
        .column(created_column())
        .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no()))
        .row_action(RowAction::edit())
        .row_action(RowAction::toggle("Toggle active"))
        .row_action_if(admin, RowAction::delete())
        .create_action_if(admin, "New shop")
        .search_placeholder("Search shops by name or slug...")
        .empty_state("ph-storefront", "No shops found", None)
}

/// Build the products table configuration.
#[must_use]
pub fn products_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("products")
            .column(TableColumn::new("imageUrl", "").kind(ColumnKind::Image))
            .column(TableColumn::sortable("name", "Product"))
            .column(TableColumn::sortable("sku", "SKU"))
            .column_if(mode.is_admin(), shop_column())
            .column(TableColumn::sortable("categoryName", "Category"))
            .column(TableColumn::sortable("brandName", "Brand").visible(false))
            .column(TableColumn::sortable("price", "Price").kind(ColumnKind::Currency))
            .column(
                TableColumn::new("compareAtPrice", "Compare at")
                    .kind(ColumnKind::Currency)
                    .visible(false),
            )
            .column(TableColumn::sortable("stock", "Stock").kind(ColumnKind::Number))
            .column(TableColumn::sortable("isFeatured", "Featured").kind(ColumnKind::Boolean))
            .column(active_column())
            .column(created_column())
            .filter(TableFilter::text("sku", "SKU", "Filter by SKU..."))
            .filter(TableFilter::number_range("price", "Price"))
            .filter(TableFilter::number_range("stock", "Stock"))
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no()))
            .filter(TableFilter::select("isFeatured", "Featured", FilterOption::yes_no()))
            .filter(TableFilter::date_range("createdAt", "Created Date"))
            .bulk_action(BulkAction::new("activate", "Activate", "ph-check-circle"))
            .bulk_action(BulkAction::new("deactivate", "Deactivate", "ph-prohibit"))
            .bulk_action(BulkAction::new("delete", "Delete", "ph-trash").destructive()),
    )
    .create_action("New product")
    .search_placeholder("Search products by name, SKU or description...")
    .empty_state(
        "ph-package",
        "No products found",
        Some("Try adjusting your search or filters"),
    )
}

/// Build the categories table configuration.
#[must_use]
pub fn categories_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("categories")
            .column(TableColumn::sortable("name", "Category"))
            .column(TableColumn::sortable("slug", "Slug").visible(false))
            .column(TableColumn::sortable("parentName", "Parent"))
            .column_if(mode.is_admin(), shop_column())
            .column(TableColumn::new("productCount", "Products").kind(ColumnKind::Number))
            .column(TableColumn::sortable("sortOrder", "Order").kind(ColumnKind::Number))
            .column(active_column())
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no())),
    )
    .create_action("New category")
    .search_placeholder("Search categories...")
    .empty_state("ph-tree-structure", "No categories found", None)
}

/// Build the brands table configuration.
#[must_use]
pub fn brands_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("brands")
            .column(TableColumn::new("logoUrl", "").kind(ColumnKind::Image))
            .column(TableColumn::sortable("name", "Brand"))
            .column(TableColumn::new("websiteUrl", "Website").kind(ColumnKind::Link))
            .column_if(mode.is_admin(), shop_column())
            .column(active_column())
            .column(created_column())
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no())),
    )
    .create_action("New brand")
    .search_placeholder("Search brands...")
    .empty_state("ph-seal-check", "No brands found", None)
}

/// Build the tags table configuration.
#[must_use]
pub fn tags_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("tags")
            .column(TableColumn::sortable("name", "Tag"))
            .column(TableColumn::sortable("slug", "Slug"))
            .column_if(mode.is_admin(), shop_column())
            .column(active_column())
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no())),
    )
    .create_action("New tag")
    .search_placeholder("Search tags...")
    .empty_state("ph-tag", "No tags found", None)
}

/// Build the attributes table configuration.
#[must_use]
pub fn attributes_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("attributes")
            .column(TableColumn::sortable("name", "Attribute"))
            .column(TableColumn::new("values", "Values").kind(ColumnKind::Badge))
            .column_if(mode.is_admin(), shop_column())
            .column(active_column())
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no())),
    )
    .create_action("New attribute")
    .search_placeholder("Search attributes...")
    .empty_state("ph-sliders", "No attributes found", None)
}

/// Build the coupons table configuration.
#[must_use]
pub fn coupons_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("coupons")
            .column(TableColumn::sortable("code", "Code"))
            .column_if(mode.is_admin(), shop_column())
            .column(TableColumn::sortable("discountType", "Type").kind(ColumnKind::Badge))
            .column(TableColumn::sortable("discountValue", "Value").kind(ColumnKind::Number))
            .column(TableColumn::sortable("usedCount", "Used").kind(ColumnKind::Number))
            .column(TableColumn::sortable("startsAt", "Starts").kind(ColumnKind::Date).visible(false))
            .column(TableColumn::sortable("expiresAt", "Expires").kind(ColumnKind::Date))
            .column(active_column())
            .filter(TableFilter::select(
                "discountType",
                "Type",
                values(DiscountType::ALL, DiscountType::as_str),
            ))
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no()))
            .filter(TableFilter::date_range("expiresAt", "Expires")),
    )
    .create_action("New coupon")
    .search_placeholder("Search coupons by code...")
    .empty_state("ph-ticket", "No coupons found", None)
}

/// Build the tax rates table configuration.
#[must_use]
pub fn tax_rates_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("tax-rates")
            .column(TableColumn::sortable("name", "Name"))
            .column(TableColumn::sortable("country", "Country"))
            .column(TableColumn::sortable("region", "Region"))
            .column(TableColumn::sortable("rate", "Rate").kind(ColumnKind::Number))
            .column_if(mode.is_admin(), shop_column())
            .column(active_column())
            .filter(TableFilter::text("country", "Country", "Two-letter code"))
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no())),
    )
    .create_action("New tax rate")
    .search_placeholder("Search tax rates...")
    .empty_state("ph-percent", "No tax rates found", None)
}

/// Build the shipping methods table configuration.
#[must_use]
pub fn shipping_methods_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("shipping-methods")
            .column(TableColumn::sortable("name", "Method"))
            .column(TableColumn::sortable("price", "Price").kind(ColumnKind::Currency))
            .column(TableColumn::sortable("estimatedDays", "Days").kind(ColumnKind::Number))
            .column_if(mode.is_admin(), shop_column())
            .column(active_column())
            .filter(TableFilter::number_range("price", "Price"))
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no())),
    )
    .create_action("New shipping method")
    .search_placeholder("Search shipping methods...")
    .empty_state("ph-truck", "No shipping methods found", None)
}

/// Build the orders table configuration.
///
/// Orders arrive from checkout, so there is no create button; only admins
/// may delete.
#[must_use]
pub fn orders_table(mode: Mode) -> DataTableConfig {
    let admin = mode.is_admin();
    DataTableConfig::new("orders")
        .column(TableColumn::sortable("orderNumber", "Order"))
        .column(TableColumn::sortable("customerName", "Customer"))
        .column(TableColumn::new("customerEmail", "Email").visible(false))
        .column_if(admin, shop_column())
        .column(TableColumn::sortable("status", "Status").kind(ColumnKind::Badge))
        .column(TableColumn::sortable("paymentStatus", "Payment").kind(ColumnKind::Badge))
        .column(TableColumn::new("itemCount", "Items").kind(ColumnKind::Number))
        .column(TableColumn::sortable("total", "Total").kind(ColumnKind::Currency))
        .column(TableColumn::sortable("createdAt", "Date").kind(ColumnKind::Date))
        .filter(TableFilter::multi_select(
            "status",
            "Status",
            values(OrderStatus::ALL, OrderStatus::as_str),
        ))
        .filter(TableFilter::multi_select(
            "paymentStatus",
            "Payment",
            values(PaymentStatus::ALL, PaymentStatus::as_str),
        ))
        .filter(TableFilter::number_range("total", "Total"))
        .filter(TableFilter::date_range("createdAt", "Order Date"))
        .row_action(RowAction::new("view", "View", "ph-eye"))
        .row_action(RowAction::edit())
        .row_action_if(admin, RowAction::delete())
        .search_placeholder("Search by order number, customer name or email...")
        .empty_state("ph-receipt", "No orders found", Some("Try adjusting your search or filters"))
}

/// Build the transactions table configuration. Read-only.
#[must_use]
pub fn transactions_table(mode: Mode) -> DataTableConfig {
    DataTableConfig::new("transactions")
        .column(TableColumn::sortable("orderNumber", "Order"))
        .column_if(mode.is_admin(), shop_column())
        .column(TableColumn::sortable("amount", "Amount").kind(ColumnKind::Currency))
        .column(TableColumn::sortable("provider", "Provider"))
        .column(TableColumn::new("reference", "Reference").visible(false))
        .column(TableColumn::sortable("status", "Status").kind(ColumnKind::Badge))
        .column(TableColumn::sortable("createdAt", "Date").kind(ColumnKind::Date))
        .filter(TableFilter::multi_select(
            "status",
            "Status",
            values(TransactionStatus::ALL, TransactionStatus::as_str),
        ))
        .filter(TableFilter::number_range("amount", "Amount"))
        .filter(TableFilter::date_range("createdAt", "Date"))
        .row_action(RowAction::new("view", "View", "ph-eye"))
        .search_placeholder("Search by order number, provider or reference...")
        .empty_state("ph-credit-card", "No transactions found", None)
}

/// Build the staff table configuration.
#[must_use]
pub fn staff_table(mode: Mode) -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("staff")
            .column(TableColumn::sortable("name", "Name"))
            .column(TableColumn::sortable("email", "Email"))
            .column(TableColumn::sortable("position", "Position"))
            .column_if(mode.is_admin(), shop_column())
            .column(active_column())
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no())),
    )
    .create_action("Add staff member")
    .search_placeholder("Search staff by name, email or position...")
    .empty_state("ph-identification-badge", "No staff found", None)
}

/// Build the reviews table configuration.
///
/// Reviews are moderated, not written, here: toggle approves or hides, and
/// admins may delete.
#[must_use]
pub fn reviews_table(mode: Mode) -> DataTableConfig {
    let admin = mode.is_admin();
    DataTableConfig::new("reviews")
        .column(TableColumn::sortable("productName", "Product"))
        .column(TableColumn::sortable("authorName", "Author"))
        .column(TableColumn::sortable("rating", "Rating").kind(ColumnKind::Rating))
        .column(TableColumn::new("title", "Title"))
        .column_if(admin, shop_column())
        .column(TableColumn::sortable("isApproved", "Approved").kind(ColumnKind::Boolean))
        .column(TableColumn::sortable("createdAt", "Date").kind(ColumnKind::Date))
        .filter(TableFilter::number_range("rating", "Rating"))
        .filter(TableFilter::select("isApproved", "Approved", FilterOption::yes_no()))
        .row_action(RowAction::toggle("Approve / hide"))
        .row_action_if(admin, RowAction::delete())
        .search_placeholder("Search reviews...")
        .empty_state("ph-star", "No reviews found", None)
}

/// Build the vendors table configuration. Admin only.
#[must_use]
pub fn vendors_table() -> DataTableConfig {
    crud_actions(
        DataTableConfig::new("vendors")
            .column(TableColumn::sortable("name", "Vendor"))
            .column(TableColumn::sortable("email", "Email"))
            .column(TableColumn::new("phone", "Phone").visible(false))
            .column(TableColumn::sortable("status", "Status").kind(ColumnKind::Badge))
            .column(TableColumn::sortable("commissionRate", "Commission").kind(ColumnKind::Number))
            .column(TableColumn::new("shopCount", "Shops").kind(ColumnKind::Number))
            .column(active_column())
            .column(created_column())
            .filter(TableFilter::multi_select(
                "status",
                "Status",
                values(VendorStatus::ALL, VendorStatus::as_str),
            ))
            .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no())),
    )
    .row_action(RowAction::new("approve", "Approve", "ph-check"))
    .row_action(RowAction::new("suspend", "Suspend", "ph-pause").destructive())
    .create_action("New vendor")
    .search_placeholder("Search vendors by name, slug or email...")
    .empty_state("ph-buildings", "No vendors found", None)
}

/// Build the users table configuration. Admin only.
#[must_use]
pub fn users_table() -> DataTableConfig {
    DataTableConfig::new("users")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::sortable("email", "Email"))
        .column(TableColumn::sortable("role", "Role").kind(ColumnKind::Badge))
        .column(TableColumn::sortable("vendorName", "Vendor"))
        .column(active_column())
        .column(created_column())
        .filter(TableFilter::multi_select(
            "role",
            "Role",
            values(UserRole::ALL, UserRole::as_str),
        ))
        .filter(TableFilter::select("isActive", "Active", FilterOption::yes_no()))
        .row_action(RowAction::toggle("Toggle active"))
        .create_action("New user")
        .search_placeholder("Search users by name or email...")
        .empty_state("ph-users", "No users found", None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::fetch::ListSpec;
    use bazaar_core::MutationKind;

    fn keys(config: &DataTableConfig) -> Vec<&str> {
        config.columns.iter().map(|c| c.key.as_str()).collect()
    }

    fn actions(config: &DataTableConfig) -> Vec<&str> {
        config.row_actions.iter().map(|a| a.key.as_str()).collect()
    }

    fn assert_sortable_columns_are_known(config: &DataTableConfig, spec: &ListSpec) {
        for column in config.columns.iter().filter(|c| c.sortable) {
            assert!(
                spec.sort_fields.iter().any(|f| f.key == column.key),
                "{}: {} is not a sort field",
                config.table_id,
                column.key
            );
        }
        for filter in &config.filters {
            assert!(
                spec.filter_fields.iter().any(|f| f.key == filter.key),
                "{}: {} is not a filter field",
                config.table_id,
                filter.key
            );
        }
    }

    #[test]
    fn test_admin_mode_adds_shop_column() {
        assert!(keys(&products_table(Mode::Admin)).contains(&"shopName"));
        assert!(!keys(&products_table(Mode::Vendor)).contains(&"shopName"));
    }

    #[test]
    fn test_order_delete_is_admin_only() {
        assert!(actions(&orders_table(Mode::Admin)).contains(&"delete"));
        assert_eq!(actions(&orders_table(Mode::Vendor)), ["view", "edit"]);
        assert!(orders_table(Mode::Admin).create_action.is_none());
    }

    #[test]
    fn test_review_actions() {
        assert_eq!(actions(&reviews_table(Mode::Vendor)), ["toggle"]);
        assert_eq!(actions(&reviews_table(Mode::Admin)), ["toggle", "delete"]);
    }

    #[test]
    fn test_suspend_vendor_is_destructive() {
        let config = vendors_table();
        let suspend = config
            .row_actions
            .iter()
            .find(|a| a.key == "suspend")
            .expect("suspend action");
        assert!(suspend.destructive);
        assert_eq!(suspend.busy_on, MutationKind::Update);
        let approve = config.row_actions.iter().find(|a| a.key == "approve");
        assert!(approve.is_some_and(|a| !a.destructive));
    }

    #[test]
    fn test_vendor_cannot_create_or_delete_shops() {
        let config = shops_table(Mode::Vendor);
        assert!(config.create_action.is_none());
        assert!(!actions(&config).contains(&"delete"));
        assert!(keys(&shops_table(Mode::Admin)).contains(&"vendorName"));
    }

    #[test]
    fn test_columns_match_list_specs() {
        for mode in [Mode::Admin, Mode::Vendor] {
            assert_sortable_columns_are_known(&shops_table(mode), &db::shops::LIST);
            assert_sortable_columns_are_known(&products_table(mode), &db::products::LIST);
            assert_sortable_columns_are_known(&categories_table(mode), &db::categories::LIST);
            assert_sortable_columns_are_known(&brands_table(mode), &db::brands::LIST);
            assert_sortable_columns_are_known(&tags_table(mode), &db::tags::LIST);
            assert_sortable_columns_are_known(&attributes_table(mode), &db::attributes::LIST);
            assert_sortable_columns_are_known(&coupons_table(mode), &db::coupons::LIST);
            assert_sortable_columns_are_known(&tax_rates_table(mode), &db::tax_rates::LIST);
            assert_sortable_columns_are_known(
                &shipping_methods_table(mode),
                &db::shipping_methods::LIST,
            );
            assert_sortable_columns_are_known(&orders_table(mode), &db::orders::LIST);
            assert_sortable_columns_are_known(&transactions_table(mode), &db::transactions::LIST);
            assert_sortable_columns_are_known(&staff_table(mode), &db::staff::LIST);
            assert_sortable_columns_are_known(&reviews_table(mode), &db::reviews::LIST);
        }
        assert_sortable_columns_are_known(&vendors_table(), &db::vendors::LIST);
        assert_sortable_columns_are_known(&users_table(), &db::users::LIST);
    }
}
