//! Mock auth and payment gateways for development and testing.
//!
//! These model the remote boundaries the marketplace would call in
//! production: an identity provider and a payment processor. Both are
//! injected behind traits so the artificial latency can be swapped for a
//! zero-delay fake in tests, and a real integration could be dropped in
//! without touching the reducers.
//!
//! The mocks never reject. There is no credential verification anywhere in
//! the current scope; the password is accepted and discarded. That is a
//! documented scope limitation, not an oversight.

use crate::types::{Money, PaymentMethod, Role, User, UserId};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Gateway result
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Boxed future returned by gateway calls (dyn-compatible)
pub type GatewayFuture<T> = Pin<Box<dyn Future<Output = GatewayResult<T>> + Send>>;

/// Gateway error
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// The charge or credential check was declined
    #[error("declined: {reason}")]
    Declined {
        /// Reason reported by the remote side
        reason: String,
    },
    /// The remote side could not be reached
    #[error("gateway unavailable: {message}")]
    Unavailable {
        /// Failure description
        message: String,
    },
}

/// Placeholder avatar handed to users created via login
pub const LOGIN_AVATAR: &str =
    "https://images.pexels.com/photos/614810/pexels-photo-614810.jpeg?w=150&h=150&fit=crop&crop=face";

/// Placeholder avatar handed to users created via signup
pub const SIGNUP_AVATAR: &str =
    "https://images.pexels.com/photos/1239291/pexels-photo-1239291.jpeg?w=150&h=150&fit=crop&crop=face";

/// Identity provider boundary
///
/// Abstraction over whatever verifies credentials and yields the session
/// user. The mock fabricates the user instead.
pub trait AuthGateway: Send + Sync {
    /// Sign an existing user in
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if authentication fails. The mock
    /// implementation never fails.
    fn authenticate(&self, email: String, password: String, role: Role) -> GatewayFuture<User>;

    /// Register a new user
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if registration fails. The mock
    /// implementation never fails.
    fn register(
        &self,
        email: String,
        password: String,
        name: String,
        role: Role,
        phone: Option<String>,
    ) -> GatewayFuture<User>;
}

/// Payment processor boundary
///
/// Abstraction over payment processors (M-Pesa, card acquirers, `PayPal`).
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` via `method`
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the charge fails. The mock
    /// implementation never fails.
    fn charge(&self, amount: Money, method: PaymentMethod) -> GatewayFuture<PaymentReceipt>;
}

/// Successful charge result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Processor-side transaction id
    pub transaction_id: String,
    /// Amount that was charged
    pub amount: Money,
    /// Method that was charged
    pub method: PaymentMethod,
}

/// Mock identity provider (always succeeds)
///
/// Sleeps for the configured latency to model the remote round-trip, then
/// fabricates the user: login derives the display name from the email
/// local-part, signup takes it explicitly.
#[derive(Debug, Clone)]
pub struct MockAuthGateway {
    latency: Duration,
}

impl MockAuthGateway {
    /// Create a gateway with the given simulated latency
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Create a zero-latency gateway for tests
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Create an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(latency: Duration) -> Arc<dyn AuthGateway> {
        Arc::new(Self::new(latency))
    }

    fn display_name(email: &str) -> String {
        email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .unwrap_or(email)
            .to_string()
    }
}

impl AuthGateway for MockAuthGateway {
    fn authenticate(&self, email: String, password: String, role: Role) -> GatewayFuture<User> {
        let latency = self.latency;
        // Accepted, never checked. See the module docs.
        let _ = password;
        Box::pin(async move {
            tokio::time::sleep(latency).await;

            let user = User {
                id: UserId::new(),
                name: Self::display_name(&email),
                email,
                role,
                phone: match role {
                    Role::Attendee => Some("+254712345678".to_string()),
                    Role::Organizer => None,
                },
                avatar: Some(LOGIN_AVATAR.to_string()),
            };

            tracing::info!(user_id = %user.id, role = %user.role, "mock login succeeded");
            Ok(user)
        })
    }

    fn register(
        &self,
        email: String,
        password: String,
        name: String,
        role: Role,
        phone: Option<String>,
    ) -> GatewayFuture<User> {
        let latency = self.latency;
        let _ = password;
        Box::pin(async move {
            tokio::time::sleep(latency).await;

            let user = User {
                id: UserId::new(),
                email,
                name,
                role,
                phone,
                avatar: Some(SIGNUP_AVATAR.to_string()),
            };

            tracing::info!(user_id = %user.id, role = %user.role, "mock signup succeeded");
            Ok(user)
        })
    }
}

/// Mock payment processor (always succeeds)
#[derive(Debug, Clone)]
pub struct MockPaymentGateway {
    latency: Duration,
}

impl MockPaymentGateway {
    /// Create a gateway with the given simulated latency
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Create a zero-latency gateway for tests
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Create an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(latency: Duration) -> Arc<dyn PaymentGateway> {
        Arc::new(Self::new(latency))
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn charge(&self, amount: Money, method: PaymentMethod) -> GatewayFuture<PaymentReceipt> {
        let latency = self.latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;

            let transaction_id = format!("txn_{}", uuid::Uuid::new_v4());
            tracing::info!(
                %transaction_id,
                amount = amount.shillings(),
                %method,
                "mock payment processed"
            );

            Ok(PaymentReceipt {
                transaction_id,
                amount,
                method,
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_derives_name_from_email_local_part() {
        let gateway = MockAuthGateway::instant();
        let user = gateway
            .authenticate(
                "amina@example.com".to_string(),
                "ignored".to_string(),
                Role::Attendee,
            )
            .await
            .unwrap();

        assert_eq!(user.name, "amina");
        assert_eq!(user.email, "amina@example.com");
        assert_eq!(user.role, Role::Attendee);
        assert!(user.phone.is_some());
    }

    #[tokio::test]
    async fn signup_keeps_explicit_name_and_phone() {
        let gateway = MockAuthGateway::instant();
        let user = gateway
            .register(
                "okello@example.com".to_string(),
                "ignored".to_string(),
                "Okello Events".to_string(),
                Role::Organizer,
                Some("+256700000000".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(user.name, "Okello Events");
        assert_eq!(user.phone.as_deref(), Some("+256700000000"));
        assert!(user.role.is_organizer());
    }

    #[tokio::test]
    async fn charge_returns_receipt_with_transaction_id() {
        let gateway = MockPaymentGateway::instant();
        let amount = Money::from_shillings(25_000);
        let receipt = gateway.charge(amount, PaymentMethod::Mpesa).await.unwrap();

        assert!(receipt.transaction_id.starts_with("txn_"));
        assert_eq!(receipt.amount, amount);
        assert_eq!(receipt.method, PaymentMethod::Mpesa);
    }
}
