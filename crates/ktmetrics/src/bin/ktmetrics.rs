fn main() {
    if let Err(err) = ktmetrics::run() {
        eprintln!("{}", ktmetrics::format_error(&err));
        std::process::exit(1);
    }
}
