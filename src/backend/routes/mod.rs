//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Router assembly and layers
//! └── api_routes.rs   - Public and authenticated route tables
//! ```
//!
//! # Authentication
//!
//! Only `/health`, `/api/auth/register` and `/api/auth/login` are public.
//! Everything else sits behind `auth_middleware`, which accepts a bearer
//! header or, for the event stream, a `token` query parameter.

/// Main router creation
pub mod router;

/// Route tables
pub mod api_routes;

pub use router::create_router;
