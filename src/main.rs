use std::process::ExitCode;

mod cache;
mod config;
mod editor;
mod error;
mod probe;
mod reconcile;
mod runtime;
mod shim;
mod site;
mod store;

#[cfg(test)]
mod testutil;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match runtime::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("audiofolio: {e}");
            ExitCode::FAILURE
        }
    }
}
