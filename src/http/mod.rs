//! HTTP/1.1 exchange layer: connection reuse, one request/response
//! transaction, request decoration and response bodies.

pub mod interceptor;
pub mod requestbody;
pub mod response;
pub mod responsebody;
pub mod streamfactory;
pub mod transaction;

// Re-exports for convenience
pub use interceptor::{Interceptor, InterceptorChain, OutgoingRequest, ResponseHead};
pub use requestbody::RequestBody;
pub use response::HttpResponse;
pub use responsebody::ResponseBody;
