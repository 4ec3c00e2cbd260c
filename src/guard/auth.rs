//! Guards reading the authenticated caller attached to the request.

use super::{Guard, RouteOptions};
use crate::{error::TransportError, request::RequestParts, thrown::Thrown};

/// Message used when a guarded route is reached without a caller identity.
pub const USER_NOT_AUTHENTICATED: &str = "User not authenticated";

/// Rejects non-public routes reached without an authenticated caller (401).
///
/// Authentication itself happens upstream; this guard only checks that it
/// produced a [`crate::request::AuthenticatedUser`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthenticatedGuard;

impl Guard for AuthenticatedGuard {
    fn check(&self, request: &RequestParts, route: &RouteOptions) -> Result<(), Thrown> {
        if route.public || request.user().is_some() {
            return Ok(());
        }
        Err(TransportError::unauthorized(USER_NOT_AUTHENTICATED).into())
    }
}

/// Admits callers holding at least one of the route's roles.
///
/// Routes listing no roles pass. Failures are 403.
///
/// ```
/// use errorframe::{
///     guard::{Guard, RolesGuard, RouteOptions},
///     request::{AuthenticatedUser, RequestParts},
/// };
///
/// let route = RouteOptions::default().roles(["admin", "ops"]);
/// let request = RequestParts::new("DELETE", "/users/7")
///     .with_user(AuthenticatedUser::new("u-1").with_roles(["viewer"]));
///
/// let error = RolesGuard.check(&request, &route).unwrap_err();
/// assert_eq!(
///     error.to_string(),
///     "Insufficient permissions. Required roles: admin, ops"
/// );
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RolesGuard;

impl Guard for RolesGuard {
    fn check(&self, request: &RequestParts, route: &RouteOptions) -> Result<(), Thrown> {
        if route.roles.is_empty() {
            return Ok(());
        }
        let user = request
            .user()
            .ok_or_else(|| TransportError::forbidden(USER_NOT_AUTHENTICATED))?;
        if route.roles.iter().any(|role| user.has_role(role)) {
            return Ok(());
        }
        Err(TransportError::forbidden(format!(
            "Insufficient permissions. Required roles: {}",
            route.roles.join(", ")
        ))
        .into())
    }
}

/// Admits callers holding every one of the route's permissions.
///
/// Routes listing no permissions pass. Failures are 403.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissionsGuard;

impl Guard for PermissionsGuard {
    fn check(&self, request: &RequestParts, route: &RouteOptions) -> Result<(), Thrown> {
        if route.permissions.is_empty() {
            return Ok(());
        }
        let user = request
            .user()
            .ok_or_else(|| TransportError::forbidden(USER_NOT_AUTHENTICATED))?;
        if route
            .permissions
            .iter()
            .all(|permission| user.has_permission(permission))
        {
            return Ok(());
        }
        Err(TransportError::forbidden(format!(
            "Insufficient permissions. Required permissions: {}",
            route.permissions.join(", ")
        ))
        .into())
    }
}
