//! # docgate-auth
//!
//! Authentication and authorization for DocGate.
//!
//! ## Modules
//!
//! - `jwt`: bearer-token verification against a shared secret or the issuer's JWKS
//! - `permission`: topic permission checks delegated to the CMS API

pub mod jwt;
pub mod permission;

pub use jwt::{Claims, TokenVerifier};
pub use permission::{CmsPermissionClient, UnrestrictedPermissions};
