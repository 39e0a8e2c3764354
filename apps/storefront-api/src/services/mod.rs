//! Service layer.
//!
//! Handlers stay thin: workflows that combine storage with the credential
//! service live here.

pub mod identity;
