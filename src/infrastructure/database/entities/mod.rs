//! Database entities module

pub mod product;
pub mod user;

pub use product::Entity as Product;
pub use user::Entity as User;
