fn main() {
    if let Err(err) = wwc_report::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
