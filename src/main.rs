use modeparm::cli::{Cli, Commands};
use modeparm::config::Config;
use modeparm::error::Result;
use modeparm::logger;
use modeparm::mode_page::BatchMode;
use tracing::{debug, error};

mod commands;

fn main() {
    let args = match Cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            // help and version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let config = Config::load(args.config.as_deref());
    let log_json = args.log_json || config.as_ref().map_or(false, |c| c.log_json);
    if let Err(e) = logger::init(args.verbose, log_json) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    debug!("modeparm starting");

    let result = config.and_then(|config| run(args, &config));
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Cli, config: &Config) -> Result<()> {
    match args.command {
        Commands::List { all, page, long } => commands::list::execute(all, page, long),

        Commands::Show {
            device,
            all,
            page,
            long,
            json,
            six,
        } => commands::show::execute(device, all, page, long, json, six, config),

        Commands::Get {
            fields,
            device,
            page,
            long,
            hex,
            json,
            six,
        } => commands::get::execute(fields, device, page, long, hex, json, six, config),

        Commands::Set {
            fields,
            device,
            page,
            save,
            dummy,
            six,
        } => commands::set::execute(BatchMode::Set, fields, device, page, save, dummy, six, config),

        Commands::Clear {
            fields,
            device,
            page,
            save,
            dummy,
            six,
        } => {
            commands::set::execute(BatchMode::Clear, fields, device, page, save, dummy, six, config)
        }

        Commands::Defaults {
            page,
            device,
            save,
            dummy,
            six,
        } => commands::defaults::execute(page, device, save, dummy, six, config),

        Commands::Inquiry { device } => commands::inquiry::execute(device, config),
    }
}
