use crate::domain::errors::IdentityError;
use crate::domain::user::models::User;
use crate::domain::user::ports::IdentityServicePort;

/// Per-request association with the resolved user, if any.
///
/// Built once per request and passed by reference. Attaching a user yields a
/// new context and leaves the original untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user: Option<User>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Copy of this context carrying `user`.
    pub fn attach(&self, user: User) -> Self {
        let mut context = self.clone();
        context.user = Some(user);
        context
    }

    /// The authenticated user. `None` means anonymous; it is never an error.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Resolve a raw credential into a request context.
///
/// Blank credentials and rejected tokens both leave the context anonymous.
///
/// # Errors
/// * `Internal` - Token verification hit a storage failure
pub async fn authenticate(
    identity: &dyn IdentityServicePort,
    context: &RequestContext,
    credential: Option<&str>,
) -> Result<RequestContext, IdentityError> {
    let token = credential.map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return Ok(context.clone());
    }

    match identity.verify_token(token).await {
        Ok(user) => Ok(context.attach(user)),
        Err(IdentityError::AuthFailed) => {
            tracing::debug!("Presented credential rejected, continuing anonymously");
            Ok(context.clone())
        }
        Err(e) => Err(e),
    }
}
