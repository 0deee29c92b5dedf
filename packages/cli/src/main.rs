use clap::Parser;

use imds_cli::Args;

fn main() {
    let args = Args::parse();
    imds_cli::init_logging(args.verbose);

    match imds_cli::run(&args) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
