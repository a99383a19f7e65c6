use super::{print_json, print_rows};
use clap::Args;
use lgview::lens::utils::trim_name;
use lgview::{OutputFormat, State, Store, Totals};
use serde::Serialize;
use tabled::Tabled;

/// Arguments for the Peers command
#[derive(Args)]
pub struct PeersArgs {
    /// Only show the N ASNs announcing the most prefixes
    #[clap(short, long)]
    pub top: Option<usize>,

    /// Maximum displayed length of AS names
    #[clap(long, default_value = "20")]
    pub name_len: usize,

    /// Maximum number of words kept from long AS names
    #[clap(long, default_value = "3")]
    pub name_words: usize,
}

#[derive(Debug, Serialize, Tabled)]
struct AsnRow {
    asn: u32,
    name: String,
    v4: u64,
    v6: u64,
    total: u64,
}

#[derive(Serialize)]
struct PeersOutput<'a> {
    totals: Totals,
    asns: &'a [AsnRow],
}

pub async fn run(store: &Store, args: PeersArgs, output_format: OutputFormat) {
    if let Err(e) = store.load_asns().await {
        eprintln!("ERROR: unable to load ASNs: {}", e);
        std::process::exit(1);
    }

    let state = store.snapshot().await;
    let rows = asn_rows(&state, &args);

    if output_format.is_json() {
        print_json(
            &PeersOutput {
                totals: state.totals,
                asns: &rows,
            },
            output_format,
        );
        return;
    }

    if output_format.is_table() {
        println!(
            "{} ASNs announcing {} prefixes ({} IPv4, {} IPv6)",
            state.asns.len(),
            state.totals.all,
            state.totals.v4,
            state.totals.v6
        );
    }
    print_rows(&rows, output_format);
}

fn asn_rows(state: &State, args: &PeersArgs) -> Vec<AsnRow> {
    let mut rows: Vec<AsnRow> = state
        .asns
        .iter()
        .map(|(asn, summary)| AsnRow {
            asn: *asn,
            name: trim_name(
                summary.as_name.as_deref().unwrap_or_default(),
                args.name_len,
                args.name_words,
            ),
            v4: summary.v4,
            v6: summary.v6,
            total: summary.total(),
        })
        .collect();

    rows.sort_by(|a, b| b.total.cmp(&a.total).then(a.asn.cmp(&b.asn)));
    if let Some(top) = args.top {
        rows.truncate(top);
    }
    rows
}
