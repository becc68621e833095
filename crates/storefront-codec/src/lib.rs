//! Payload transit tokens for storefront URLs.
//!
//! Two tracks move a cart, product or package selection between pages
//! without a server round trip:
//!
//! - **Envelope** tokens wrap the payload in `{type, data, timestamp}` and
//!   encode it into the URL-safe base64 alphabet. No confidentiality.
//! - **Sealed** tokens compress the payload and encrypt it with a static
//!   pre-shared key, for the "buy now" checkout handoff. A compress-only
//!   variant shrinks browsing links.
//!
//! Sealed tokens only deter casual editing of the address bar. The key ships
//! with every client, so the server must re-validate price and stock before
//! it commits an order.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_codec::{DeepLinkParam, DeepLinkQuery, EnvelopeCodec};
//!
//! let codec = EnvelopeCodec::new();
//! let token = codec.encode_product(&selection)?;
//!
//! let mut query = DeepLinkQuery::default();
//! query.set(DeepLinkParam::Product, token);
//! let url = format!("/products/42?{}", query.to_query_string());
//! ```

mod clock;
mod config;
mod deeplink;
mod envelope;
mod error;
mod sealed;
mod transform;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CodecConfig;
pub use deeplink::{DeepLinkParam, DeepLinkQuery};
pub use envelope::{Envelope, EnvelopeCodec, PayloadType};
pub use error::CodecError;
pub use sealed::{SealedCodec, MAX_PAYLOAD_BYTES};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Clock, CodecConfig, CodecError, DeepLinkParam, DeepLinkQuery, Envelope, EnvelopeCodec,
        ManualClock, PayloadType, SealedCodec, SystemClock,
    };
}
