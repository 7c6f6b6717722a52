//! Domain models for the dashboard.

pub mod attribute;
pub mod brand;
pub mod category;
pub mod coupon;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod shipping_method;
pub mod shop;
pub mod staff;
pub mod tag;
pub mod tax_rate;
pub mod transaction;
pub mod user;
pub mod validate;
pub mod vendor;

pub use attribute::{Attribute, AttributeFields, AttributeInput};
pub use brand::{Brand, BrandFields, BrandInput};
pub use category::{Category, CategoryFields, CategoryInput};
pub use coupon::{Coupon, CouponDetail, CouponFields, CouponInput};
pub use dashboard::DashboardSummary;
pub use order::{Order, OrderDetail, OrderItem, OrderUpdate, OrderUpdateInput};
pub use product::{
    BulkProductAction, BulkProductInput, Product, ProductDetail, ProductFields, ProductInput,
};
pub use review::Review;
pub use session::CurrentUser;
pub use shipping_method::{ShippingMethod, ShippingMethodFields, ShippingMethodInput};
pub use shop::{Shop, ShopFields, ShopInput, ShopOption};
pub use staff::{Staff, StaffFields, StaffInput};
pub use tag::{Tag, TagFields, TagInput};
pub use tax_rate::{TaxRate, TaxRateFields, TaxRateInput};
pub use transaction::Transaction;
pub use user::{NewUserFields, NewUserInput, User};
pub use validate::Validate;
pub use vendor::{Vendor, VendorFields, VendorInput, VendorStatusInput};
