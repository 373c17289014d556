//! Multi-backend aggregating client
//!
//! Fans each query out to every configured backend adapter and merges the
//! per-backend results into one unified answer, summing counts on
//! author-key collision.

mod composite;

pub use composite::{CompositeClient, CompositeConfig};
