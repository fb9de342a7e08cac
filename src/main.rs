use std::process::ExitCode;

fn main() -> ExitCode {
    match plexus::window::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("plexus: {e}");
            ExitCode::FAILURE
        }
    }
}
