#[tokio::main]
async fn main() {
    nautilus_lib::run().await
}
