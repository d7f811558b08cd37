//! FeedRepository implementations.

pub mod inmemory;

pub use inmemory::InMemoryFeedRepository;
