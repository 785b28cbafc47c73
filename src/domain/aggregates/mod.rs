//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod user;
pub mod exhibition;

pub use product::{Product, ProductDraft, ProductError};
pub use order::{Delivery, LineItem, Order, OrderError, OrderKind, OrderStatus, PaymentMethod};
pub use cart::{Cart, CartError, CartItem};
pub use user::{Actor, Role, User};
pub use exhibition::{Exhibition, ExhibitionDraft, ExhibitionError, ExhibitionStatus, Interest};
