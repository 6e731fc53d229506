use febos::FebosClient;
use febos::services::shell::{Command, Flow, Shell};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};

fn login_from_env() -> Option<Command> {
    let username = std::env::var("FEBOS_USERNAME").ok().filter(|v| !v.trim().is_empty())?;
    let password = std::env::var("FEBOS_PASSWORD").ok().filter(|v| !v.is_empty())?;
    Some(Command::Login {
        username: username.trim().to_string(),
        password,
    })
}

fn run() -> io::Result<()> {
    let client = match FebosClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };
    info!("Using {}", client.base_url());

    let mut shell = Shell::new(&client);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    if let Some(login) = login_from_env() {
        info!("Logging in with credentials from environment");
        // Through the shell so `resources` sees the installation list.
        shell.run(login, &mut stdout)?;
    } else {
        warn!("FEBOS_USERNAME/FEBOS_PASSWORD not set; use `login` first");
    }

    writeln!(stdout, "Type `help` for the command list.")?;
    let mut line = String::new();
    loop {
        write!(stdout, "febos> ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }
        if shell.run_line(line.trim_end(), &mut stdout)? == Flow::Exit {
            break;
        }
    }
    Ok(())
}

fn main() {
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    info!(
        "febos-shell {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("console i/o failed: {}", e);
    }
}
