use clap::Parser;
use miette::Result;
use stockgrid::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    stockgrid::core::logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::List(args) => stockgrid::cli::commands::list::run(args, &global),
        Commands::Stats(args) => stockgrid::cli::commands::stats::run(args, &global),
        Commands::Export(args) => stockgrid::cli::commands::export::run(args, &global),
        Commands::Config(cmd) => stockgrid::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => stockgrid::cli::commands::completions::run(args),
    }
}
