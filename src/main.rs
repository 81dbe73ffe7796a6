#[actix_web::main]
async fn main() -> std::io::Result<()> {
    hunt_permit_server::run().await
}
