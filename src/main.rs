fn main() {
    if let Err(err) = csv_dataset::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
