pub mod persistence;
pub mod recommendation;

pub use persistence::PersistenceClient;
pub use recommendation::RecommendationClient;
