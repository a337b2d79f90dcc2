use color_eyre::Result;
use docverify::cli::{self, CliCommand};
use docverify::logging;

fn main() -> Result<()> {
    let args = match cli::parse_args(std::env::args()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, cli::USAGE);
            std::process::exit(2);
        }
    };

    color_eyre::install()?;
    logging::init_tracing(args.verbose);

    let ok = match args.command {
        CliCommand::Version => {
            println!("{}", cli::version_line());
            true
        }
        CliCommand::Help => {
            println!("{}", cli::USAGE);
            true
        }
        CliCommand::Parse {
            input,
            sse,
            request_id,
        } => cli::run_parse(&input, sse, request_id.as_deref())?,
        CliCommand::Send {
            message,
            attachments,
            stream,
        } => {
            // Runtime only for the network path; parsing stays synchronous
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::run_send(&message, &attachments, stream))?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
