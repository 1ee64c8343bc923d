//! Serializes asynchronous workflows so at most one runs at a time.
//!
//! Automated interactions against the external document must never
//! overlap: each workflow both reads the tree and waits for it to settle,
//! and a second workflow started mid-flight would act on a view the first
//! is still changing. The serializer keeps a single tail reference and
//! appends each new workflow behind it, giving strict FIFO execution by
//! enqueue time without any explicit lock around the document itself.

mod chain;

pub use chain::Serializer;
