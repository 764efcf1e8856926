//! Supabase backend: auth, PostgREST tables and the store built on them.

pub mod client;
pub mod store;

pub use client::{QueryBuilder, SupabaseClient, SupabaseError};
