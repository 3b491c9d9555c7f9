use std::process::ExitCode;

fn main() -> ExitCode {
    match waste_sorter_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
