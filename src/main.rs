fn main() {
    #[cfg(feature = "cli")]
    huffarc::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("archiver: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
