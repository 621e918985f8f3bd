//! Domain entity definitions.

mod fake;
mod image;
mod request;
mod token;

pub use fake::{FakeRequestKey, FakeResponse};
pub use self::image::{
    CacheKey, CorruptCachePolicy, DownloadOutcome, ImageSource, LoadedImage, MAX_CACHE_NAME_BYTES,
};
pub use request::{
    DOWNLOAD_ACCEPT, DownloadRequest, HttpMethod, InFlightRequestIdentity, OperationKind,
};
pub use token::AuthToken;
