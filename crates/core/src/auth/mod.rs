//! Session-bound refresh-token rotation.
//!
//! - [`codec`] -- HS512 access-token encoding and structural validation.
//! - [`hashing`] -- Argon2id hashing of refresh secrets.
//! - [`secrets`] -- token identifiers and refresh secrets, real or fixed.
//! - [`clock`] -- injectable time source.
//! - [`store`] -- session/user persistence and notifier traits.
//! - [`memory`] -- in-process implementations of those traits.
//! - [`rotator`] -- [`SessionRotator`], issuance and rotation of token pairs.
//! - [`deadline`] -- caller-supplied time limits around rotator calls.

pub mod clock;
pub mod codec;
pub mod deadline;
pub mod error;
pub mod hashing;
pub mod memory;
pub mod rotator;
pub mod secrets;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{AccessClaims, TokenCodec, TokenError};
pub use deadline::run_with_deadline;
pub use error::{BoxError, SessionError, SessionErrorKind};
pub use rotator::{SessionPolicy, SessionRotator, TokenPair};
pub use secrets::{FixedSecrets, OsSecrets, SecretError, SecretGenerator};
pub use store::{
    NewSession, Notifier, NotifyError, Session, SessionStore, SessionUpdate, StoreError, User,
    UserStore,
};
