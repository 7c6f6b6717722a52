//! Per-entity form factories.
//!
//! Field names and limits mirror the `*Input` payloads and their
//! [`Validate`](crate::models::Validate) rules, so a value the dialog accepts
//! is one the server accepts too (reference checks aside).

use rust_decimal::Decimal;

use bazaar_core::{DiscountType, Mode, OrderStatus, PaymentStatus, UserRole};

use super::data_table::FilterOption;
use super::form::{FieldKind, FormField, FormSchema};
use crate::models::ShopOption;
use crate::models::coupon::MAX_CODE_LENGTH;
use crate::models::validate::{MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

/// The target-shop select. Admins always pick a shop; vendors only when they
/// own more than one.
fn shop_field(mode: Mode, shops: &[ShopOption]) -> Option<FormField> {
    if !mode.is_admin() && shops.len() <= 1 {
        return None;
    }
    let options = shops
        .iter()
        .map(|shop| FilterOption::new(&shop.id.to_string(), &shop.name))
        .collect();
    Some(FormField::select("shopId", "Shop", options).required())
}

fn with_shop(schema: FormSchema, mode: Mode, shops: &[ShopOption]) -> FormSchema {
    match shop_field(mode, shops) {
        Some(field) => schema.field(field),
        None => schema,
    }
}

fn name_field() -> FormField {
    FormField::text("name", "Name").required().max_length(MAX_NAME_LENGTH)
}

fn slug_field() -> FormField {
    FormField::text("slug", "Slug").help("Leave blank to derive it from the name")
}

fn description_field() -> FormField {
    FormField::textarea("description", "Description").max_length(MAX_TEXT_LENGTH)
}

fn money_field(name: &str, label: &str) -> FormField {
    FormField::number(name, label).min(Decimal::ZERO)
}

fn options<T: Copy>(all: &[T], as_str: fn(T) -> &'static str) -> Vec<FilterOption> {
    FilterOption::from_values(all.iter().map(|v| as_str(*v)))
}

/// Build the shop form. Admins also choose the owning vendor.
#[must_use]
pub fn shop_form(mode: Mode) -> FormSchema {
    FormSchema::new("shop", "Shop")
        .field_if(
            mode.is_admin(),
            FormField::select("vendorId", "Vendor", vec![])
                .options_from("vendors")
                .help("Required when creating a shop"),
        )
        .field(name_field())
        .field(slug_field())
        .field(description_field())
        .field(FormField::url("logoUrl", "Logo URL"))
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the product form.
#[must_use]
pub fn product_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("product", "Product"), mode, shops)
        .field(name_field())
        .field(slug_field())
        .field(FormField::text("sku", "SKU").max_length(64))
        .field(description_field())
        .field(FormField::new("imageUrl", "Image", FieldKind::File))
        .field(money_field("price", "Price").required())
        .field(money_field("compareAtPrice", "Compare-at price").help("Must be at least the price"))
        .field(FormField::number("stock", "Stock").min(Decimal::ZERO).default_value(0.into()))
        .field(FormField::select("categoryId", "Category", vec![]).options_from("categories"))
        .field(FormField::select("brandId", "Brand", vec![]).options_from("brands"))
        .field(FormField::new("tagIds", "Tags", FieldKind::MultiSelect).options_from("tags"))
        .field(FormField::checkbox("isActive", "Active", true))
        .field(FormField::checkbox("isFeatured", "Featured", false))
}

/// Build the category form.
#[must_use]
pub fn category_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("category", "Category"), mode, shops)
        .field(name_field())
        .field(slug_field())
        .field(FormField::select("parentId", "Parent category", vec![]).options_from("categories"))
        .field(description_field())
        .field(FormField::new("imageUrl", "Image", FieldKind::File))
        .field(FormField::number("sortOrder", "Sort order").default_value(0.into()))
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the brand form.
#[must_use]
pub fn brand_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("brand", "Brand"), mode, shops)
        .field(name_field())
        .field(slug_field())
        .field(description_field())
        .field(FormField::new("logoUrl", "Logo", FieldKind::File))
        .field(FormField::url("websiteUrl", "Website").placeholder("https://"))
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the tag form.
#[must_use]
pub fn tag_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("tag", "Tag"), mode, shops)
        .field(name_field())
        .field(slug_field())
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the attribute form.
#[must_use]
pub fn attribute_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("attribute", "Attribute"), mode, shops)
        .field(name_field())
        .field(slug_field())
        .field(
            FormField::new("values", "Values", FieldKind::MultiSelect)
                .required()
                .help("e.g. S, M, L"),
        )
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the coupon form.
#[must_use]
pub fn coupon_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("coupon", "Coupon"), mode, shops)
        .field(
            FormField::text("code", "Code")
                .required()
                .max_length(MAX_CODE_LENGTH)
                .help("Letters, digits, '-' and '_'; stored uppercase"),
        )
        .field(description_field())
        .field(
            FormField::select(
                "discountType",
                "Discount type",
                options(DiscountType::ALL, DiscountType::as_str),
            )
            .required(),
        )
        .field(
            FormField::number("discountValue", "Discount value")
                .required()
                .min(Decimal::ZERO)
                .help("Percentages go up to 100"),
        )
        .field(money_field("minimumOrderAmount", "Minimum order"))
        .field(FormField::number("usageLimit", "Usage limit").min(Decimal::ONE))
        .field(FormField::new("startsAt", "Starts", FieldKind::Date))
        .field(FormField::new("expiresAt", "Expires", FieldKind::Date))
        .field(FormField::new("productIds", "Products", FieldKind::MultiSelect).options_from("products"))
        .field(
            FormField::new("categoryIds", "Categories", FieldKind::MultiSelect)
                .options_from("categories"),
        )
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the tax rate form.
#[must_use]
pub fn tax_rate_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("tax-rate", "Tax rate"), mode, shops)
        .field(name_field())
        .field(
            FormField::text("country", "Country")
                .required()
                .max_length(2)
                .placeholder("US"),
        )
        .field(FormField::text("region", "Region").max_length(100))
        .field(
            FormField::number("rate", "Rate (%)")
                .required()
                .min(Decimal::ZERO)
                .max(Decimal::ONE_HUNDRED),
        )
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the shipping method form.
#[must_use]
pub fn shipping_method_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("shipping-method", "Shipping method"), mode, shops)
        .field(name_field())
        .field(description_field())
        .field(money_field("price", "Price").required())
        .field(FormField::number("estimatedDays", "Estimated days").min(Decimal::ZERO))
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the staff form.
#[must_use]
pub fn staff_form(mode: Mode, shops: &[ShopOption]) -> FormSchema {
    with_shop(FormSchema::new("staff", "Staff member"), mode, shops)
        .field(name_field())
        .field(FormField::new("email", "Email", FieldKind::Email).required())
        .field(FormField::text("position", "Position").max_length(MAX_NAME_LENGTH))
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the order form. Only status, payment status and notes are editable.
#[must_use]
pub fn order_form() -> FormSchema {
    FormSchema::new("order", "Order")
        .field(FormField::select(
            "status",
            "Status",
            options(OrderStatus::ALL, OrderStatus::as_str),
        ))
        .field(FormField::select(
            "paymentStatus",
            "Payment status",
            options(PaymentStatus::ALL, PaymentStatus::as_str),
        ))
        .field(FormField::textarea("notes", "Notes").max_length(MAX_TEXT_LENGTH))
}

/// Build the vendor form. Admin only.
#[must_use]
pub fn vendor_form() -> FormSchema {
    FormSchema::new("vendor", "Vendor")
        .field(name_field())
        .field(slug_field())
        .field(FormField::new("email", "Email", FieldKind::Email).required())
        .field(FormField::text("phone", "Phone").max_length(MAX_NAME_LENGTH))
        .field(
            FormField::number("commissionRate", "Commission (%)")
                .min(Decimal::ZERO)
                .max(Decimal::ONE_HUNDRED)
                .default_value("10".into()),
        )
        .field(FormField::checkbox("isActive", "Active", true))
}

/// Build the user form. Admin only; customers are not created here.
#[must_use]
pub fn user_form() -> FormSchema {
    let roles = [UserRole::Admin, UserRole::Vendor];
    FormSchema::new("user", "User")
        .field(FormField::new("email", "Email", FieldKind::Email).required())
        .field(name_field())
        .field(
            FormField::new("password", "Password", FieldKind::Password)
                .required()
                .help("At least 8 characters"),
        )
        .field(FormField::select("role", "Role", options(&roles, UserRole::as_str)).required())
        .field(
            FormField::select("vendorId", "Vendor", vec![])
                .options_from("vendors")
                .help("Required for vendor users"),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{CouponInput, ProductInput, Validate};
    use bazaar_core::ShopId;
    use serde_json::json;

    fn shops(n: i32) -> Vec<ShopOption> {
        (1..=n)
            .map(|id| ShopOption {
                id: ShopId::new(id),
                name: format!("Shop {id}"),
            })
            .collect()
    }

    #[test]
    fn test_shop_select_by_mode() {
        assert!(product_form(Mode::Admin, &shops(1)).get("shopId").is_some());
        assert!(product_form(Mode::Vendor, &shops(1)).get("shopId").is_none());
        let form = product_form(Mode::Vendor, &shops(2));
        let field = form.get("shopId").unwrap();
        assert_eq!(field.options[1], FilterOption::new("2", "Shop 2"));
        assert!(field.required);
    }

    #[test]
    fn test_admin_must_pick_a_listed_shop() {
        let form = brand_form(Mode::Admin, &shops(2));
        let values = json!({"name": "Acme", "shopId": "9"});
        let errors = form.validate(values.as_object().unwrap()).unwrap_err();
        assert!(errors.has("shopId"));
    }

    #[test]
    fn test_defaults_pass_server_validation() {
        let form = product_form(Mode::Vendor, &shops(1));
        let mut values = form.defaults();
        values.insert("name".into(), json!("Mug"));
        values.insert("price".into(), json!("12.50"));
        assert!(form.validate(&values).is_ok());

        let input: ProductInput = serde_json::from_value(values.into()).unwrap();
        let fields = input.validate().unwrap();
        assert!(fields.is_active);
        assert!(!fields.is_featured);
    }

    #[test]
    fn test_coupon_form_matches_input() {
        let form = coupon_form(Mode::Vendor, &shops(1));
        let values = json!({"code": "spring", "discountType": "percentage", "discountValue": "15"});
        assert!(form.validate(values.as_object().unwrap()).is_ok());
        let input: CouponInput = serde_json::from_value(values).unwrap();
        assert_eq!(input.validate().unwrap().code, "SPRING");

        let missing = form.validate(&serde_json::Map::new()).unwrap_err();
        assert!(missing.has("code") && missing.has("discountType") && missing.has("discountValue"));
    }

    #[test]
    fn test_order_form_fields() {
        let names: Vec<_> = order_form().fields.into_iter().map(|f| f.name).collect();
        assert_eq!(names, ["status", "paymentStatus", "notes"]);
    }
}
