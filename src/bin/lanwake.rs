use lanwake::action;
use lanwake::net;

use action::{WakeOnLanAction, WakeOnLanParameters};
use clap::Parser;
use log::info;
use net::InterfaceSource;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MAC address of the machine to wake, e.g. aa:bb:cc:dd:ee:ff.
    #[arg(env = "LANWAKE_MAC_ADDR", required_unless_present = "list_interfaces")]
    mac_addr: Option<String>,

    /// If true, log the datagrams instead of sending them.
    #[arg(long)]
    dry_run: bool,

    /// If true, print each interface and where its packet would go, then exit
    /// without sending anything.
    #[arg(long)]
    list_interfaces: bool,

    /// If true, print the result as JSON.
    #[arg(long)]
    json: bool,
}

fn list_interfaces(source: &dyn InterfaceSource) -> Result<(), Box<dyn std::error::Error>> {
    for iface in source.interfaces()? {
        let target = match (iface.is_eligible(), iface.select_target()) {
            (false, _) => "skipped".to_string(),
            (true, None) => "no target".to_string(),
            (true, Some(target)) => target.to_string(),
        };
        println!(
            "{:<16} {:?}/{:?} {}",
            iface.name, iface.kind, iface.status, target
        );
    }
    Ok(())
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("INFO"))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();

    if args.list_interfaces {
        list_interfaces(&net::sys::SystemInterfaces::new())?;
        return Ok(ExitCode::SUCCESS);
    }

    let wol = if args.dry_run {
        info!("Dry run, nothing will be sent");
        WakeOnLanAction::new(
            Box::new(net::sys::SystemInterfaces::new()),
            Box::new(net::noop::LogOnlySender),
        )
    } else {
        WakeOnLanAction::default()
    };

    let result = wol.execute(&WakeOnLanParameters {
        mac_address: args.mac_addr.unwrap_or_default(),
    });
    if args.json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        println!("{}", result.user_message);
    }
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
