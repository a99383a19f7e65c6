use super::print_json;
use clap::Args;
use lgview::{LgAction, OutputFormat, Proto, RequestStatus, Store};

/// Arguments for the Ping and Trace commands
#[derive(Args)]
pub struct LgArgs {
    /// IP address or hostname to reach
    pub host: String,

    /// Force IPv4 or IPv6
    #[clap(short, long, value_enum, default_value = "any")]
    pub proto: Proto,
}

pub async fn run(store: &Store, action: LgAction, args: LgArgs, output_format: OutputFormat) {
    let LgArgs { host, proto } = args;

    let request = match store.run_lg_action(action, &host, proto).await {
        Ok(request) => request,
        Err(e) => {
            eprintln!("ERROR: {} {} failed: {}", action, host, e);
            std::process::exit(1);
        }
    };

    if output_format.is_json() {
        print_json(&request, output_format);
        return;
    }

    match request.status {
        RequestStatus::Failed => {
            eprintln!("ERROR: the looking glass refused to {} {}", action, host);
            std::process::exit(1);
        }
        _ => println!("{}", request.result.unwrap_or_default().trim_end()),
    }
}
