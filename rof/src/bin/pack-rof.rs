use rof_bin::{cli, commands, logging};

fn main() {
    let result = cli::parse_args::<cli::PackArgs>().and_then(|args| {
        logging::init(args.verbose);
        commands::pack(args)
    });

    rof_bin::exit_with(result);
}
