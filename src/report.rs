use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local};
use colored::*;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{ContentArrangement, Table};

use crate::record::DiscoveredRecord;

const RULE_WIDTH: usize = 88;

const BANNER: &str = r#"
     _                           _
  __| | ___  ___ _ __  ___ _   _| |__
 / _` |/ _ \/ _ \ '_ \/ __| | | | '_ \
| (_| |  __/  __/ |_) \__ \ |_| | |_) |
 \__,_|\___|\___| .__/|___/\__,_|_.__/
                |_|
"#;

pub fn print_banner() {
    let width = BANNER.lines().map(str::len).max().unwrap_or(0);
    println!("{}", BANNER);
    println!("{}", "=".repeat(width));
    println!(
        "{}",
        format!("{:^width$}", "Recursive subdomain brute-forcer", width = width).yellow()
    );
    println!(
        "{}",
        format!("{:^width$}", format!("Version: v{}", env!("CARGO_PKG_VERSION")), width = width)
    );
    println!("{}", "=".repeat(width));
}

pub fn print_target_header(target: &str, started: DateTime<Local>) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!(
        "{}",
        format!("[INFO] Discovering subdomains for: {}", target).cyan()
    );
    println!("[INFO] Started at {}", started.format("%d-%m-%Y %H:%M:%S"));
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn discovered_line(record: &DiscoveredRecord) -> String {
    format!(
        "[DISCOVERED] {} ---> [IP: {}] ---> [Status: {}]",
        record.subdomain, record.ip, record.status
    )
}

pub fn print_discovered(record: &DiscoveredRecord) {
    println!("{}", discovered_line(record).green());
}

pub fn print_interrupted() {
    println!(
        "\n{}",
        "[INFO] Interrupted by user. Saving results...".red()
    );
}

pub fn print_saved(path: &Path) {
    println!(
        "{}",
        format!("[SAVED] Results saved to {}", path.display()).yellow()
    );
}

pub fn summary_table(records: &[DiscoveredRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Subdomain", "IP", "Status"]);

    for (i, record) in records.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            record.subdomain.clone(),
            record.ip.clone(),
            record.status.to_string(),
        ]);
    }
    table
}

pub fn print_summary(records: &[DiscoveredRecord]) {
    println!("{}", "[SUMMARY] Results:".magenta());
    println!("\n{}", "-".repeat(RULE_WIDTH));
    println!("  Discovered Subdomains: {}", records.len());
    println!("{}", "-".repeat(RULE_WIDTH));
    println!("{}", summary_table(records));
    println!("{}", "-".repeat(RULE_WIDTH));
}

pub fn print_elapsed(elapsed: Duration) {
    println!("[+] Completed in {:.2} seconds.", elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_discovered_line() {
        let record = DiscoveredRecord::new(
            "www.example.com".to_string(),
            IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
            None,
        );
        assert_eq!(
            discovered_line(&record),
            "[DISCOVERED] www.example.com ---> [IP: 93.184.216.34] ---> [Status: N/A]"
        );
    }

    #[test]
    fn test_summary_table_rows() {
        let ip = IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3));
        let records = vec![
            DiscoveredRecord::new("a.example.com".to_string(), ip, Some(200)),
            DiscoveredRecord::new("b.example.com".to_string(), ip, None),
        ];

        let rendered = summary_table(&records).to_string();
        assert!(rendered.contains("Subdomain"));
        assert!(rendered.contains("a.example.com"));
        assert!(rendered.contains("N/A"));

        let a = rendered.find("a.example.com").unwrap();
        let b = rendered.find("b.example.com").unwrap();
        assert!(a < b);
    }
}
