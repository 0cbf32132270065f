use colored::Colorize;

fn main() {
    fixgen::logging::init_tracing();
    let command_line_interface = fixgen::cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
