#[tokio::main]
async fn main() {
    recipe_feedback_be::start_server().await;
}
