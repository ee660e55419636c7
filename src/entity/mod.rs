pub mod audit_logs;
pub mod cart_items;
pub mod customers;
pub mod order_counters;
pub mod orders;
pub mod packages;
pub mod users;
pub mod vendors;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use customers::Entity as Customers;
pub use order_counters::Entity as OrderCounters;
pub use orders::Entity as Orders;
pub use packages::Entity as Packages;
pub use users::Entity as Users;
pub use vendors::Entity as Vendors;
