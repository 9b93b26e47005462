pub mod buffer;
pub mod fetcher;
pub mod traits;

pub use buffer::{BodySink, ResponseBuffer};
pub use fetcher::{
    FetchError, Manifest, ManifestDefect, ManifestFetcher, ManifestQuery, ManifestStatus,
    QueryTooLong,
};
pub use traits::{HttpResponse, HttpTransport, TransportError};
