#[tokio::main]
async fn main() {
    dolphin_translate_lib::run().await
}
