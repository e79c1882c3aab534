fn main() {
    if let Err(err) = logmerge::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
