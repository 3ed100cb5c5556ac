//! Authorization gate.
//!
//! A short-circuiting predicate chain evaluated strictly in order after
//! token validation: authenticated, role membership, subscription. Pure
//! policy with no routing knowledge; each call site supplies a
//! [`GatePolicy`] and a [`SubscriptionProbe`] for the store re-fetch.

use async_trait::async_trait;
use thiserror::Error;

use crate::token::Role;
use crate::token::SessionClaims;
use crate::token::SubscriptionStatus;

/// Infrastructure fault from the credential store, distinct from a refusal:
/// "the system could not determine whether you are allowed".
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// Which predicate refused the caller. Observability only; user-visible
/// refusals stay uniform in shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    Role,
    Subscription,
}

/// Gate refusal or store fault.
#[derive(Debug, Clone, Error)]
pub enum GateError {
    /// No validated claims were supplied. Distinct from an invalid or
    /// expired token so refusal causes stay observable in logs.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden ({0:?})")]
    Forbidden(ForbiddenReason),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Point re-fetch of the current subscription status for an account.
///
/// Subscription state can change between token issuance and use, so the
/// subscriber predicate never trusts the claim snapshot.
#[async_trait]
pub trait SubscriptionProbe: Send + Sync {
    async fn subscription_status(&self, account_id: &str)
        -> Result<SubscriptionStatus, StoreError>;
}

/// Per-call-site authorization requirements.
#[derive(Debug, Clone, Default)]
pub struct GatePolicy {
    allowed_roles: Vec<Role>,
    require_subscription: bool,
}

impl GatePolicy {
    /// Any authenticated caller.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Callers whose role is in the allowed set.
    pub fn with_roles(roles: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed_roles: roles.into(),
            require_subscription: false,
        }
    }

    /// Additionally require an active subscription. Admins bypass this
    /// predicate unconditionally.
    pub fn subscriber_only(mut self) -> Self {
        self.require_subscription = true;
        self
    }
}

/// Evaluate the gate for validated claims (or their absence).
///
/// Predicates short-circuit on first failure, so a request with no
/// credential on a role-restricted route is `Unauthenticated`, never
/// `Forbidden`. The probe is consulted only when the subscription predicate
/// actually applies.
pub async fn check<P>(
    claims: Option<&SessionClaims>,
    policy: &GatePolicy,
    probe: &P,
) -> Result<(), GateError>
where
    P: SubscriptionProbe + ?Sized,
{
    let claims = claims.ok_or(GateError::Unauthenticated)?;

    if !policy.allowed_roles.is_empty() && !policy.allowed_roles.contains(&claims.role) {
        return Err(GateError::Forbidden(ForbiddenReason::Role));
    }

    if policy.require_subscription && claims.role != Role::Admin {
        let current = probe.subscription_status(&claims.sub).await?;
        if current != SubscriptionStatus::Active {
            return Err(GateError::Forbidden(ForbiddenReason::Subscription));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use chrono::Duration;

    use super::*;

    /// Probe returning a fixed status and counting calls.
    struct FixedProbe {
        status: SubscriptionStatus,
        calls: AtomicUsize,
    }

    impl FixedProbe {
        fn new(status: SubscriptionStatus) -> Self {
            Self {
                status,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SubscriptionProbe for FixedProbe {
        async fn subscription_status(
            &self,
            _account_id: &str,
        ) -> Result<SubscriptionStatus, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.status)
        }
    }

    struct FailingProbe;

    #[async_trait]
    impl SubscriptionProbe for FailingProbe {
        async fn subscription_status(
            &self,
            _account_id: &str,
        ) -> Result<SubscriptionStatus, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn claims(role: Role, subscription: SubscriptionStatus) -> SessionClaims {
        SessionClaims::new("account-1", role, subscription, Duration::hours(1))
    }

    #[tokio::test]
    async fn test_missing_credential_is_unauthenticated_not_forbidden() {
        let probe = FixedProbe::new(SubscriptionStatus::Active);
        let policy = GatePolicy::with_roles(vec![Role::Admin]).subscriber_only();

        let result = check(None, &policy, &probe).await;

        assert!(matches!(result, Err(GateError::Unauthenticated)));
        assert_eq!(probe.call_count(), 0);
    }

    #[tokio::test]
    async fn test_role_refusal_short_circuits_subscription() {
        let probe = FixedProbe::new(SubscriptionStatus::Active);
        let policy = GatePolicy::with_roles(vec![Role::Admin]).subscriber_only();
        let claims = claims(Role::User, SubscriptionStatus::Active);

        let result = check(Some(&claims), &policy, &probe).await;

        assert!(matches!(
            result,
            Err(GateError::Forbidden(ForbiddenReason::Role))
        ));
        assert_eq!(probe.call_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_refused_without_active_subscription() {
        for status in [SubscriptionStatus::None, SubscriptionStatus::Canceled] {
            let probe = FixedProbe::new(status);
            let policy = GatePolicy::authenticated().subscriber_only();
            let claims = claims(Role::User, SubscriptionStatus::Active);

            let result = check(Some(&claims), &policy, &probe).await;

            assert!(matches!(
                result,
                Err(GateError::Forbidden(ForbiddenReason::Subscription))
            ));
        }
    }

    #[tokio::test]
    async fn test_fresh_status_overrides_stale_claim_snapshot() {
        // Claim says active; store says canceled. The store wins.
        let probe = FixedProbe::new(SubscriptionStatus::Canceled);
        let policy = GatePolicy::authenticated().subscriber_only();
        let claims = claims(Role::User, SubscriptionStatus::Active);

        let result = check(Some(&claims), &policy, &probe).await;

        assert!(matches!(
            result,
            Err(GateError::Forbidden(ForbiddenReason::Subscription))
        ));
        assert_eq!(probe.call_count(), 1);
    }

    #[tokio::test]
    async fn test_active_subscriber_passes() {
        let probe = FixedProbe::new(SubscriptionStatus::Active);
        let policy = GatePolicy::authenticated().subscriber_only();
        let claims = claims(Role::User, SubscriptionStatus::None);

        assert!(check(Some(&claims), &policy, &probe).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_bypasses_subscription_without_probe() {
        let probe = FixedProbe::new(SubscriptionStatus::None);
        let policy = GatePolicy::authenticated().subscriber_only();
        let claims = claims(Role::Admin, SubscriptionStatus::None);

        assert!(check(Some(&claims), &policy, &probe).await.is_ok());
        assert_eq!(probe.call_count(), 0);
    }

    #[tokio::test]
    async fn test_store_fault_is_not_a_refusal() {
        let policy = GatePolicy::authenticated().subscriber_only();
        let claims = claims(Role::User, SubscriptionStatus::Active);

        let result = check(Some(&claims), &policy, &FailingProbe).await;

        assert!(matches!(result, Err(GateError::Store(_))));
    }

    #[tokio::test]
    async fn test_authenticated_policy_ignores_role_and_subscription() {
        let probe = FixedProbe::new(SubscriptionStatus::None);
        let policy = GatePolicy::authenticated();
        let claims = claims(Role::User, SubscriptionStatus::None);

        assert!(check(Some(&claims), &policy, &probe).await.is_ok());
        assert_eq!(probe.call_count(), 0);
    }
}
