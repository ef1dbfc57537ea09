extern crate pretty_env_logger;

#[macro_use]
extern crate log;

use clap::Parser;
use varvenn::{
    duos_main, single_main, trios_main, vardb_main, Cli, Commands, Result, VarvennParams,
};

fn setup_logging(args: &dyn VarvennParams) {
    let level = if args.debug() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .init();

    info!("starting");
    info!("params: {:#?}", args);
    if !args.validate() {
        error!("please fix arguments");
        std::process::exit(1);
    }
}

fn main() {
    let cli = Cli::parse();
    let result: Result<()> = match &cli.command {
        Commands::Single(args) => {
            setup_logging(args);
            single_main(args)
        }
        Commands::Duos(args) => {
            setup_logging(args);
            duos_main(args)
        }
        Commands::Trios(args) => {
            setup_logging(args);
            trios_main(args)
        }
        Commands::Vardb(args) => {
            setup_logging(args);
            vardb_main(args)
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("finished");
}
