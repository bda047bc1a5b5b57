use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match rowembed_lib::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
