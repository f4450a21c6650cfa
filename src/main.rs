fn main() {
    if let Err(error) = mediview::runtime::init_logging() {
        eprintln!("{error}");
    }

    if let Err(error) = mediview::run_cli() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
