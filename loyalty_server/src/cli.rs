use std::env;

const HELP: &str = include_str!("./cli-help.txt");

/// Only these variables are echoed back. None of them carry credentials.
const REPORTED_ENVS: [&str; 11] = [
    "RUST_LOG",
    "LPG_HOST",
    "LPG_PORT",
    "LPG_DATABASE_URL",
    "LPG_DB_MAX_CONNECTIONS",
    "LPG_AUTO_MIGRATE",
    "LPG_ACCRUAL_SYSTEM_ADDRESS",
    "LPG_ACCRUAL_TIMEOUT",
    "LPG_ACCRUAL_POLL_INTERVAL",
    "LPG_BALANCE_UPDATE_INTERVAL",
    "LPG_DISABLE_WORKERS",
];

/// The server is configured through the environment alone. Any argument at all prints the help text and the current
/// settings, and returns `true` so that `main` exits instead of starting the server.
pub fn handle_command_line_args() -> bool {
    if env::args_os().len() <= 1 {
        return false;
    }
    println!("\n{HELP}\n");
    println!("Current environment values:");
    for name in REPORTED_ENVS {
        println!("  {name:<35} {}", describe_env(name));
    }
    true
}

fn describe_env(name: &str) -> String {
    match env::var_os(name) {
        None => "Not set".into(),
        Some(v) => match v.into_string() {
            Ok(s) => s,
            Err(raw) => format!("Invalid value: {}", raw.to_string_lossy()),
        },
    }
}
