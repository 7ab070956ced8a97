//! Entry point for the `ipam` binary.
#![forbid(unsafe_code)]

#[expect(
    clippy::print_stderr,
    reason = "The binary reports fatal errors on stderr before exiting"
)]
fn main() {
    if let Err(err) = ipam_cli::run() {
        eprintln!("ipam: {}", err.report());
        std::process::exit(1);
    }
}
