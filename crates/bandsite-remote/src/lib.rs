//! Bandsite Remote - HTTP storage backend for a PostgREST/Supabase project.

pub mod client;
pub mod params;

pub use client::SupabaseClient;
