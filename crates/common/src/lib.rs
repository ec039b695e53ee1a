//! Types shared between the minibin daemon and its clients.
//!
//! - [`short_id`]: identifier specs and generators
//! - [`bin`]: the `{content, language, iv}` payload
//! - [`crypto`]: client-side encryption and share-link keys
//! - [`version`]: build information

pub mod bin;
pub mod crypto;
pub mod short_id;
pub mod version;

pub mod prelude {
    pub use crate::bin::Bin;
    pub use crate::crypto::{CryptoError, SecretKey};
    pub use crate::short_id::{
        IdGenerator, RandomIdGenerator, SequenceIdGenerator, ShortId, ShortIdSpec,
        ShortIdSpecError, DEFAULT_SHORT_ID_CHARSET, DEFAULT_SHORT_ID_LENGTH,
    };
    pub use crate::version::BuildInfo;
}
