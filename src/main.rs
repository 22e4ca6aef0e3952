#[tokio::main]
async fn main() {
    inscription_backend::run().await;
}
