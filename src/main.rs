use std::{env, process};

use sprig::{
    display_error,
    driver::{read_source, write_output, CompileError, Driver, DriverOptions},
    init_tracing,
};

const USAGE: &str = "usage: sprigc <file.sp> [-o <out.wat>] [--emit=wat|ast|tokens]";

fn main() {
    init_tracing();

    let options = match DriverOptions::from_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {}", message);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let source = match read_source(&options.input) {
        Ok(source) => source,
        Err(error) => fail(&error, &options, ""),
    };

    let mut driver = Driver::new();
    let result = driver
        .emit(&source, options.emit)
        .and_then(|text| write_output(options.output.as_deref(), &text));

    if let Err(error) = result {
        fail(&error, &options, &source);
    }
}

fn fail(error: &CompileError, options: &DriverOptions, source: &str) -> ! {
    match error.diagnostic() {
        Some(diagnostic) => display_error(diagnostic, &options.input, source),
        None => eprintln!("Error: {}", error),
    }

    process::exit(error.exit_code());
}
