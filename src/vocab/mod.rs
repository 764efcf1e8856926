//! Vocabulary domain: profiles, word pairs and the store they live in.

pub mod languages;
pub mod models;
pub mod store;

pub use models::{
    AuthUser, NewWordPair, PracticeAnswer, PracticeStats, Profile, ProfileUpdate, Session,
    ValidationError, WordPair, WordPairUpdate,
};
pub use store::{StoreError, VocabStore};
