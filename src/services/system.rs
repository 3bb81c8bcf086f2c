//! Host capability probing

use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Check whether an external program can be executed
pub async fn check_command_available(program: &str) -> bool {
    let available = Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .is_ok();

    if available {
        info!("{} is available", program);
    } else {
        debug!("{} is not available", program);
    }
    available
}
