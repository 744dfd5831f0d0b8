//! Entity module - Contains all SeaORM entity definitions for the marketplace database.
//! Each entity has a Model struct for data and an Entity struct for operations.
//! Status enumerations live next to the entity that stores them.

pub mod delivery;
pub mod order;
pub mod order_item;
pub mod product;
pub mod subscription;
pub mod system_state;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use delivery::{
    Column as DeliveryColumn, DeliveryStatus, Entity as Delivery, Model as DeliveryModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use subscription::{
    Column as SubscriptionColumn, Entity as Subscription, Frequency, Model as SubscriptionModel,
    SubscriptionStatus,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user::{ApprovalStatus, Column as UserColumn, Entity as User, Model as UserModel, Role};
