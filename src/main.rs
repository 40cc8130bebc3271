#[actix_web::main]
async fn main() -> std::io::Result<()> {
    siakad_surat_server::run().await
}
