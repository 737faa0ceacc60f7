//! # Bastion Core
//!
//! Foundational types shared by every Bastion crate:
//!
//! - [`errors`]: the exception taxonomy and its JSON rendering
//! - [`locale`]: language of validation messages
//! - [`response`]: success envelopes
//! - [`pagination`]: page parameters
//! - [`password`]: salted bcrypt hashing

pub mod errors;
pub mod locale;
pub mod pagination;
pub mod password;
pub mod response;

pub use errors::{AppException, ErrorCode};
pub use locale::Locale;
pub use pagination::PageParams;
pub use response::{ApiResponse, PageData};
