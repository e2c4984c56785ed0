pub mod augment;
pub mod error;
pub mod fields;
pub mod router;
pub mod server;
pub mod shutdown;
pub mod stream;
pub mod transform;
pub mod tracing;
pub mod upstream;

pub use augment::{AugmentStats, RequestAugmenter};
pub use router::{build_router, RouterEngine};
pub use server::{ProxyServer, ServerError};
pub use stream::{ReasoningStream, StreamRewriter};
pub use transform::BlockingTransformer;
