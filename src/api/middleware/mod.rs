mod logging;

pub use logging::{logging_middleware, RequestId};
