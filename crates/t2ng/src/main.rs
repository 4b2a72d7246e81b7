//! The `t2ng` executable.

fn main() {
    std::process::exit(t2ng_cli::run_cli(std::env::args().collect()));
}
