//! HTTP services for `ragserve`.
//!
//! Two independent services share this crate:
//!
//! - the **RAG service** ([`rag::router`]): `POST /api/rag_chat` answers a
//!   query from the in-memory document store, `POST /api/upload` persists
//!   and ingests a text file;
//! - the **chat passthrough** ([`chat::router`]): `POST /api/chat` flattens
//!   a message history into a transcript and forwards it to a completion
//!   backend.
//!
//! All state is injected explicitly ([`state::RagState`],
//! [`state::ChatState`]); there are no process-global pipelines.

pub mod chat;
pub mod config;
pub mod error;
pub mod rag;
pub mod state;
