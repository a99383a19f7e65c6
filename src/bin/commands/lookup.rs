use super::{print_rows, PrefixRow};
use clap::Args;
use lgview::{LookupOptions, OutputFormat, Store};

/// Arguments for the Lookup command
#[derive(Args)]
pub struct LookupArgs {
    /// IP address or prefix, e.g. 1.1.1.1 or 185.130.44.0/24
    pub address: String,

    /// Also return prefixes contained in (or containing) the address
    #[clap(short, long)]
    pub all: bool,

    /// Only match prefixes originated by this ASN
    #[clap(long)]
    pub asn: Option<u32>,

    /// Result page of a non-exact search, starting at 1
    #[clap(short, long)]
    pub page: Option<u64>,
}

pub async fn run(store: &Store, args: LookupArgs, output_format: OutputFormat) {
    let LookupArgs {
        address,
        all,
        asn,
        page,
    } = args;

    let options = LookupOptions {
        exact: !all,
        asn,
        page,
    };
    store.search_prefixes_with(&address, &options).await;

    let state = store.snapshot().await;
    if state.error.error {
        eprintln!("ERROR: lookup for {} failed: {}", address, state.error);
        std::process::exit(1);
    }

    let rows: Vec<PrefixRow> = state.search_results.iter().map(PrefixRow::from).collect();
    if rows.is_empty() {
        eprintln!("No prefixes found for {}", address);
        return;
    }
    print_rows(&rows, output_format);
    if output_format.is_table() && state.search_pages > 1 {
        println!(
            "page {} of {} (use --page to see more)",
            page.unwrap_or(1),
            state.search_pages
        );
    }
}
