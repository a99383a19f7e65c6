use super::print_json;
use chrono::Utc;
use lgview::lens::utils::format_age;
use lgview::{OutputFormat, Store};

pub async fn run(store: &Store, output_format: OutputFormat) {
    if let Err(e) = store.load_info().await {
        eprintln!("ERROR: unable to load server info: {}", e);
        std::process::exit(1);
    }

    let Some(info) = store.snapshot().await.info else {
        return;
    };

    if output_format.is_json() {
        print_json(&info, output_format);
        return;
    }

    if let Some(message) = &info.message {
        println!("{}", message);
    }
    let version = [&info.git_tag, &info.git_branch, &info.git_commit]
        .iter()
        .filter_map(|v| v.as_deref())
        .collect::<Vec<_>>()
        .join(" / ");
    if !version.is_empty() {
        println!("Version:        {}", version);
    }
    if let Some(total) = info.total_prefixes {
        println!("Total prefixes: {}", total);
    }
    match info.latest_prefix_time {
        Some(t) => println!(
            "Latest prefix:  {} ({})",
            t.to_rfc3339(),
            format_age(t, Utc::now())
        ),
        None => println!("Latest prefix:  unknown"),
    }
    if let Some(prefix) = &info.latest_prefix {
        println!("                {}", prefix.prefix);
    }
}
