pub mod feedback;
pub mod redis;

pub use feedback::{
    AverageRatingResponse, Feedback, FeedbackCreateRequest, FeedbackResponse,
    FeedbackUpdateRequest, NewFeedback,
};
