fn main() {
    if let Err(err) = csv_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
