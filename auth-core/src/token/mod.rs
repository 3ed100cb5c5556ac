pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::Role;
pub use claims::SessionClaims;
pub use claims::SubscriptionStatus;
pub use errors::TokenError;
pub use handler::TokenHandler;
