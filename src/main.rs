fn main() {
    if let Err(e) = digital_card::run() {
        tracing::error!("{}", e);
        eprintln!("digital-card: {e}");
        std::process::exit(1);
    }
}
