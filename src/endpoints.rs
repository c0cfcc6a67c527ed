//! The API endpoints URIs.

/// The route for getting the dashboard summary of the current user as JSON.
pub const DASHBOARD_API: &str = "/api/dashboard";
