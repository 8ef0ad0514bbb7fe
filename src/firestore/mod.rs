//! Firestore-backed [`UserStore`](crate::accounts::repo::UserStore).

mod auth;
mod client;
mod credentials;
mod value;

pub use client::FirestoreStore;
