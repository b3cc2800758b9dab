#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    railtrack_server::run().await
}
