fn main() {
    if let Err(e) = studyaid_lib::run() {
        tracing::error!(error = %e, "studyaid failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
