fn main() {
    if let Err(err) = sheet_cleaner::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
