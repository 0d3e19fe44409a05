#[macro_use]
extern crate log;

use pingo::{cli::App, resolve, transport::IcmpTransport, Session};
use std::process;

fn main() {
    let config = match App::parse_args() {
        Ok(config) => config,
        Err(e) => {
            let code = App::exit_code(&*e);
            if code == 0 {
                println!("{}", e);
            } else {
                eprintln!("pingo: could not parse provided argument: {}", e);
            }
            process::exit(code);
        }
    };

    let target = match resolve::resolve(&config.dest, config.ipv6) {
        Ok(target) => target,
        Err(e) => {
            println!("ping: {}", e);
            process::exit(e.exit_code());
        }
    };

    trace!("Open raw transport");

    let transport = match IcmpTransport::open(&target.addr, config.timeout) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Could not open raw socket: {}", e);
            process::exit(1);
        }
    };

    let session = match Session::new(transport, target.addr, config.session()) {
        Ok(session) => session,
        Err(e) => {
            error!("Could not configure ping session: {}", e);
            process::exit(1);
        }
    };

    println!(
        "PING {} ({}): {} data bytes",
        target.host, target.addr, config.size
    );

    let report = session.run(|probe| {
        println!(
            "{} bytes from {}: icmp_seq={} time={:.3} ms",
            probe.bytes,
            probe.source,
            probe.sequence,
            probe.millis()
        )
    });

    if let Some(e) = report.error {
        error!("An error occurred during a running ping session: {}", e);
        process::exit(1);
    }

    trace!("Successfully ended ping session");
}
