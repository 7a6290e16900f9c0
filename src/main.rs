fn main() {
    #[cfg(feature = "cli")]
    oxidiff::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxidiff: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
