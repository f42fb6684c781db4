pub mod feedback;

pub use feedback::{
    create_feedback_handler, delete_feedback_handler, get_all_feedbacks_handler,
    get_average_rating_handler, get_feedback_handler, get_feedbacks_by_recipe_handler,
    get_feedbacks_by_user_handler, health_handler, send_to_recommendation_handler,
    update_feedback_handler,
};
