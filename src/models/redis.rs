use uuid::Uuid;

pub struct RedisKey;

impl RedisKey {
    pub fn feedback(id: Uuid) -> String {
        format!("feedback:{id}")
    }

    pub fn feedback_pattern() -> String {
        "feedback:*".to_string()
    }
}
