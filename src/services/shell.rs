//! Interactive command shell over `FebosClient`.
//!
//! Each line is parsed into a `Command` and dispatched to one endpoint. Parse and
//! endpoint errors are printed; they never end the session.

use std::io::{self, Write};

use crate::auth::Credentials;
use crate::client::FebosClient;
use crate::endpoints;
use crate::models::febos::*;
use crate::services::discovery;
use crate::transport::Transport;

pub const HELP: &str = "\
Commands:
  login <username> <password>
  installation [pageStart] [pageItems]
  pageconfig <installationId>
  realtimeget <installationId> <group[,group...]>
  slave <installationId> <deviceId>
  language <installationId> <deviceId>
  dataanalysis <installationId> <deviceId> [from] [to]
  historicaldata <installationId> <groups> <from> <to>
  resources
  help
  exit | quit
Arguments containing spaces must be double-quoted, e.g. \"2026-02-11 00:00:00\".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Installation { page_start: u64, page_items: u64 },
    PageConfig { installation_id: i64 },
    RealtimeGet { installation_id: i64, groups: Vec<String> },
    Slave { installation_id: i64, device_id: i64 },
    Language { installation_id: i64, device_id: i64 },
    DataAnalysis {
        installation_id: i64,
        device_id: i64,
        from: Option<String>,
        to: Option<String>,
    },
    HistoricalData {
        installation_id: i64,
        groups: String,
        from: String,
        to: String,
    },
    Resources,
    Help,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Split on whitespace, honouring double quotes.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated double quote".to_string());
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

fn arg<'a>(args: &'a [String], idx: usize, name: &str) -> Result<&'a str, String> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument <{name}>"))
}

fn number<N: std::str::FromStr>(args: &[String], idx: usize, name: &str) -> Result<N, String> {
    let raw = arg(args, idx, name)?;
    raw.parse().map_err(|_| format!("<{name}> must be a number, got {raw:?}"))
}

fn no_more(args: &[String], max: usize) -> Result<(), String> {
    if args.len() > max {
        return Err(format!("unexpected argument: {}", args[max]));
    }
    Ok(())
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let tokens = tokenize(line)?;
        let Some((name, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let cmd = match name.to_ascii_lowercase().as_str() {
            "login" => {
                no_more(args, 2)?;
                Command::Login {
                    username: arg(args, 0, "username")?.to_string(),
                    password: arg(args, 1, "password")?.to_string(),
                }
            }
            "installation" => {
                no_more(args, 2)?;
                Command::Installation {
                    page_start: if args.is_empty() { 1 } else { number(args, 0, "pageStart")? },
                    page_items: if args.len() < 2 { 500_000 } else { number(args, 1, "pageItems")? },
                }
            }
            "pageconfig" => {
                no_more(args, 1)?;
                Command::PageConfig {
                    installation_id: number(args, 0, "installationId")?,
                }
            }
            "realtimeget" => {
                no_more(args, 2)?;
                let groups = arg(args, 1, "groups")?
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect();
                Command::RealtimeGet {
                    installation_id: number(args, 0, "installationId")?,
                    groups,
                }
            }
            "slave" | "language" => {
                no_more(args, 2)?;
                let installation_id = number(args, 0, "installationId")?;
                let device_id = number(args, 1, "deviceId")?;
                if name.eq_ignore_ascii_case("slave") {
                    Command::Slave {
                        installation_id,
                        device_id,
                    }
                } else {
                    Command::Language {
                        installation_id,
                        device_id,
                    }
                }
            }
            "dataanalysis" => {
                no_more(args, 4)?;
                Command::DataAnalysis {
                    installation_id: number(args, 0, "installationId")?,
                    device_id: number(args, 1, "deviceId")?,
                    from: args.get(2).cloned(),
                    to: args.get(3).cloned(),
                }
            }
            "historicaldata" => {
                no_more(args, 4)?;
                Command::HistoricalData {
                    installation_id: number(args, 0, "installationId")?,
                    groups: arg(args, 1, "groups")?.to_string(),
                    from: arg(args, 2, "from")?.to_string(),
                    to: arg(args, 3, "to")?.to_string(),
                }
            }
            "resources" => Command::Resources,
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(Some(cmd))
    }
}

pub struct Shell<'a, T: Transport> {
    client: &'a FebosClient<T>,
    installation_ids: Vec<i64>,
}

impl<'a, T: Transport> Shell<'a, T> {
    pub fn new(client: &'a FebosClient<T>) -> Self {
        Shell {
            client,
            installation_ids: Vec::new(),
        }
    }

    /// Parse and run one line, writing results or the error to `out`.
    pub fn run_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        match Command::parse(line) {
            Ok(None) => Ok(Flow::Continue),
            Ok(Some(cmd)) => self.run(cmd, out),
            Err(e) => {
                writeln!(out, "error: {e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn run(&mut self, cmd: Command, out: &mut impl Write) -> io::Result<Flow> {
        let result = match cmd {
            Command::Exit => return Ok(Flow::Exit),
            Command::Help => {
                writeln!(out, "{HELP}")?;
                writeln!(out, "Endpoints:")?;
                for d in endpoints::ALL {
                    writeln!(out, "  {:<20} {:<4} {}", d.name, d.method.as_str(), d.path)?;
                }
                return Ok(Flow::Continue);
            }
            Command::Login { username, password } => self
                .client
                .login(&Credentials::new(username, password))
                .map(|profile| {
                    self.installation_ids = profile.installation_id_list.clone();
                    print_login(&profile)
                }),
            Command::Installation { page_start, page_items } => {
                self.client.installations(page_start, page_items).map(|l| print_installations(&l))
            }
            Command::PageConfig { installation_id } => {
                self.client.page_config(installation_id).map(|c| print_page_config(&c))
            }
            Command::RealtimeGet { installation_id, groups } => {
                self.client.realtime_data(installation_id, groups).map(|d| print_realtime(&d))
            }
            Command::Slave {
                installation_id,
                device_id,
            } => self.client.febos_slaves(installation_id, device_id).map(|s| print_slaves(&s)),
            Command::Language {
                installation_id,
                device_id,
            } => self
                .client
                .language(installation_id, device_id)
                .map(|l| format!("language {} (ts {})\n", l.id_language, l.ts)),
            Command::DataAnalysis {
                installation_id,
                device_id,
                from,
                to,
            } => self
                .client
                .data_analysis(installation_id, device_id, from.as_deref(), to.as_deref())
                .map(|rows| print_data_analysis(&rows)),
            Command::HistoricalData {
                installation_id,
                groups,
                from,
                to,
            } => self
                .client
                .historical_data(installation_id, &groups, &from, &to)
                .map(|entries| print_historical(&entries)),
            Command::Resources => discovery::discover(self.client, &self.installation_ids).map(|resources| {
                let mut s = String::new();
                for (key, value) in &resources {
                    let shown = value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
                    s.push_str(&format!("{key} = {shown}\n"));
                }
                s.push_str(&format!("{} resource(s)\n", resources.len()));
                s
            }),
        };

        match result {
            Ok(text) => write!(out, "{text}")?,
            Err(e) => writeln!(out, "error: {e}")?,
        }
        Ok(Flow::Continue)
    }
}

fn print_login(profile: &LoginPostResponse) -> String {
    format!(
        "logged in as {} <{}> ({}), installations: {:?}\n",
        profile.username, profile.email, profile.profile_name, profile.installation_id_list
    )
}

fn print_installations(list: &[Installation]) -> String {
    let mut s = String::new();
    for i in list {
        s.push_str(&format!(
            "{:>8}  {:<16} {:<24} tenant={} alarms={}\n",
            i.id,
            i.code,
            i.label,
            i.tenant_name,
            i.num_alarm.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
        ));
    }
    s.push_str(&format!("{} installation(s)\n", list.len()));
    s
}

fn print_page_config(cfg: &PageConfigGetResponse) -> String {
    let mut s = format!("installation {} ({})\n", cfg.installation.id, cfg.installation.label);
    for d in cfg.device_map.values() {
        s.push_str(&format!("  device {} {} [{}]\n", d.id, d.label, d.model_name));
    }
    for t in cfg.thing_map.values() {
        s.push_str(&format!("  thing {} {} @{} [{}]\n", t.id, t.label, t.address, t.thing_type_name));
    }
    for g in cfg.input_groups() {
        s.push_str(&format!(
            "  group {} ({} input(s))\n",
            g.input_group_get_code,
            g.input_list.len()
        ));
    }
    s
}

fn print_realtime(entries: &[RealtimeData]) -> String {
    let mut s = String::new();
    for e in entries {
        s.push_str(&format!("device {} thing {} @ {}\n", e.device_id, e.thing_id, e.ts));
        for (code, value) in &e.data {
            s.push_str(&format!("  {code} = {}\n", value.i));
        }
    }
    s
}

fn print_slaves(slaves: &[Slave]) -> String {
    let mut s = String::new();
    for sl in slaves {
        s.push_str(&format!(
            "{} {:<12} temp={} set={} humid={} status={}\n",
            sl.indirizzo_slave, sl.nome_slave, sl.temp, sl.set_temp, sl.humid, sl.status_slave
        ));
    }
    s
}

fn print_data_analysis(rows: &[DataAnalysisEntry]) -> String {
    let mut s = String::new();
    for r in rows {
        let values = r.extra.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ");
        s.push_str(&format!("{} {}\n", r.ts, values));
    }
    s
}

fn print_historical(entries: &[HistoricalDataEntry]) -> String {
    let mut s = String::new();
    for e in entries {
        s.push_str(&format!("{} device {} thing {}\n", e.group_code, e.device_id, e.thing_id));
        for point in &e.data {
            match e.labelled(point) {
                Some(pairs) => {
                    let values = pairs.iter().map(|(c, v)| format!("{c}={v}")).collect::<Vec<_>>().join(" ");
                    s.push_str(&format!("  {} {}\n", point.ts, values));
                }
                None => s.push_str(&format!(
                    "  {} malformed: {} value(s) for {} input(s)\n",
                    point.ts,
                    point.vs.len(),
                    e.input_array.len()
                )),
            }
        }
    }
    s
}
