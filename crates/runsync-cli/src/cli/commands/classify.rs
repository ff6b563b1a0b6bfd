use crate::cli::args::ClassifyArgs;
use crate::exit_codes::EXIT_SUCCESS;

/// Print `<kind>\t<file>` for every file, in argument order.
pub fn run(args: &ClassifyArgs) -> i32 {
    for file in &args.files {
        println!("{}\t{}", runsync_core::classify(file), file.display());
    }
    EXIT_SUCCESS
}
