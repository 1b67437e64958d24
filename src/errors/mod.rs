//! Error classification and HTTP error responses

pub mod codec;
pub mod codes;
pub mod public;
pub mod registry;
pub mod response;
pub mod shutdown;
pub mod validation;
pub mod wrap;

pub use codec::DecodeError;
pub use codes::ErrorCode;
pub use public::{as_public, EncodedError, PublicError};
pub use registry::{RegistryError, StatusRegistry};
pub use response::{Discloser, ErrorDocument, ErrorKind, ErrorView, RenderedError};
pub use shutdown::{is_shutdown, Shutdown};
pub use validation::{as_validation, ValidationErrors};
pub use wrap::{Wrapped, Wrapper};
