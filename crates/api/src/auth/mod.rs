//! Authentication: JWT issuance, password hashing, and the session service.

pub mod jwt;
pub mod password;
pub mod service;
