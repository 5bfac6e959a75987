fn main() {
    if let Err(e) = refdoc_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
