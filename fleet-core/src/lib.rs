//! fleet-core: domain records for fleet management
//!
//! Plain data records mirroring table rows, the text-encoded enums stored in
//! their status columns, input validation and pagination. Storage and HTTP
//! live in `fleet-server`.

pub mod pagination;
pub mod records;
pub mod status;
pub mod validation;

pub use pagination::{Page, PageParams, Paginated, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use records::*;
pub use status::*;
pub use validation::{PlateNumbers, Username, ValidationError};
