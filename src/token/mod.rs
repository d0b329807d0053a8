//! Token Module
//!
//! The token collaborators the cache consumes: parsing, verification,
//! validity checks and bearer extraction.

mod bearer;
mod claims;
mod codec;

pub use bearer::extract_bearer_token;
pub use claims::{Claims, Token};
pub use codec::{decode, verify, VerificationKey};
