use super::{print_json, print_rows, PrefixRow};
use clap::Args;
use lgview::{Family, OutputFormat, Prefix, PrefixQuery, Store};

/// Arguments for the Prefixes command
#[derive(Args)]
pub struct PrefixesArgs {
    /// ASN whose prefixes to list
    pub asn: u32,

    /// Address family to show
    #[clap(long, value_enum, default_value = "all")]
    pub family: Family,

    /// Page to load, starting at 1
    #[clap(short, long, default_value = "1")]
    pub page: u64,

    /// Show a single prefix of the page, by id or CIDR
    #[clap(short, long)]
    pub select: Option<String>,
}

pub async fn run(store: &Store, args: PrefixesArgs, output_format: OutputFormat) {
    let PrefixesArgs {
        asn,
        family,
        page,
        select,
    } = args;

    let query = PrefixQuery::for_asn(asn)
        .with_family(family)
        .with_page(page);
    if let Err(e) = store.load_prefixes(&query.into()).await {
        eprintln!("ERROR: unable to load prefixes for AS{}: {}", asn, e);
        std::process::exit(1);
    }

    if let Some(key) = select {
        let selected = match key.parse::<i64>() {
            Ok(id) => store.select_prefix_by_id(id).await,
            Err(_) => store.select_prefix_by_cidr(&key).await,
        };
        match selected {
            Some(prefix) => print_selected(&prefix, output_format),
            None => eprintln!("No prefix '{}' on page {} of AS{}", key, page, asn),
        }
        return;
    }

    let state = store.snapshot().await;
    let rows: Vec<PrefixRow> = state.prefixes.iter().map(PrefixRow::from).collect();
    print_rows(&rows, output_format);
    if output_format.is_table() {
        println!(
            "page {} of {} ({})",
            page,
            state.pages.for_family(family),
            family
        );
    }
}

fn print_selected(prefix: &Prefix, output_format: OutputFormat) {
    if output_format.is_json() {
        print_json(prefix, output_format);
    } else {
        print_rows(&[PrefixRow::from(prefix)], output_format);
    }
}
