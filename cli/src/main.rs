use abn_lookup_cli::{init_tracing, run, Cli};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}
