#[rocket::main]
async fn main() {
    if let Err(e) = hideseek_deck::rocket_initialize().launch().await {
        log::error!("server stopped: {e}");
        std::process::exit(1);
    }
}
