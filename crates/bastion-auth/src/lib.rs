//! # Bastion Auth
//!
//! - [`claims`]: the signed session payload
//! - [`token`]: [`TokenService`] (issue / verify) and [`extract_token`]
//! - [`identity`]: the request-scoped subject id and its extractor

pub mod claims;
pub mod identity;
pub mod token;

pub use claims::Claims;
pub use identity::{
    CurrentUser, Identity, bind_identity, get_identity, identity_of, missing_identity,
};
pub use token::{IssuedToken, NEW_TOKEN_HEADER, TokenError, TokenService, extract_token};
