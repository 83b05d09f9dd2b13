//! # Logctx Architecture
//!
//! Logctx is a structured-logging library whose one opinion is that **the
//! context you attach to a logger belongs in your errors too**. Loggers
//! accumulate key/value attributes and named groups through chained
//! derivation calls; when something goes wrong deep inside that chain, an
//! error built with [`error::ContextError`] carries the whole accumulated
//! context in its message, with no hand-threading of request ids through
//! every function signature.
//!
//! ## How the Pieces Fit
//!
//! ```text
//! Logger  ──with()/with_group()──▶  Logger'  (new instance, old untouched)
//!   │
//!   ▼
//! ContextHandler          tracks the attribute/group tree, AND
//!   │                     forwards everything to the base handler
//!   ▼
//! TextHandler / JsonHandler / MemoryHandler    formats + emits records
//! ```
//!
//! The [`context::ContextHandler`] is middleware: emission decisions and
//! record handling are the base handler's, untouched. Its only job is to
//! keep a readable shadow of the context, because handler internals are
//! not introspectable once attributes have been pushed in.
//!
//! ## Derivation Is Cheap and Safe
//!
//! Every `with`/`with_group` call returns a brand-new logger/handler pair;
//! nothing is mutated in place. Derived loggers can be handed to other
//! threads freely, and rendering a parent's context is never affected by
//! what its children do.
//!
//! ## Module Overview
//!
//! - [`logger`]: The cloneable `Logger` front end and the process default
//! - [`context`]: Context tracking and the bracketed-string renderer
//! - [`handler`]: The `Handler` trait and the text/JSON/memory backends
//! - [`attr`]: Attribute and value model (`Attr`, `Value`, lazy values)
//! - [`model`]: `Level` and `Record`
//! - [`error`]: Error types, including the context-carrying `ContextError`

pub mod attr;
pub mod context;
pub mod error;
pub mod handler;
pub mod logger;
pub mod model;
