//! Filter builder: query parameters to store-independent predicates.

pub mod dates;
mod filters;
pub mod pagination;
pub mod predicate;
pub mod text;

pub use pagination::{Page, PageParams, Paginated};
pub use predicate::{Condition, Predicate, Test, Value};
pub use text::TextPattern;
