pub mod factory;
pub mod feedback;

pub use feedback::{
    create_feedback, delete_feedback, forward_recent_feedbacks, get_all_feedbacks,
    get_average_rating, get_feedback_by_id, get_feedbacks_by_recipe, get_feedbacks_by_user,
    update_feedback,
};
