//! Derived-data caches.
//!
//! Both caches are correctness caches over a bounded document set (low
//! thousands), so there is no eviction beyond explicit invalidation.
//! All mutation goes through `invalidate`; no external component
//! touches cache contents directly.

mod frontmatter;
mod progress;

pub use frontmatter::FrontmatterCache;
pub use progress::ProgressCache;
