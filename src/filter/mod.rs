pub mod filters;
pub mod types;

pub use filters::{validate_filters, Filters, MAX_PAGE, MAX_PAGE_SIZE};
pub use types::{calculate_metadata, Metadata, SortDirection};
