//! HTTP handlers, one module per resource.
//!
//! Every handler here sits behind the auth gate; results are serialized
//! directly as JSON without an envelope.

pub mod category;
pub mod task;
