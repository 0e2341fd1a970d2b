// Cooking chart lab: named JSON recipes with a manual display order.
// Storage is chosen once at startup (SQLite file or PostgreSQL) behind RecipeStore.

pub mod handlers;
pub mod models;
pub mod ordering;
pub mod postgres;
pub mod sqlite;
pub mod store;
pub mod validation;

pub use store::RecipeStore;
