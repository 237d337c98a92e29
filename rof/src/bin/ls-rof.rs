use rof_bin::{cli, commands, logging};

fn main() {
    let result = cli::parse_args::<cli::ListArgs>().and_then(|args| {
        logging::init(args.verbose);
        commands::list(args)
    });

    rof_bin::exit_with(result);
}
