// Route handlers, grouped by area:
// system (public) and the admin course routes behind `require_admin`.
pub mod prerequisites;
pub mod schedule;
pub mod system;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a UUID path segment, reporting failures against `field`.
pub(crate) fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::field_error(field, format!("'{}' is not a valid id", raw)))
}
