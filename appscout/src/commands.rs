use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

const STOREFRONTS: [&str; 2] = ["google_play", "app_store"];

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("appscout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("appscout")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log every fetch, link and skipped listing")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl storefront listings breadth-first from seed URLs or categories, \
                filter them and append matches to a CSV file.",
                )
                .arg(
                    arg!(-s --"seed" <URL>)
                        .required(false)
                        .help("A listing, category page or feed URL to start from (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-H --"seeds-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed URLs")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"category" <NAME>)
                        .required(false)
                        .help("Seed from a storefront category by name or id (repeatable, 'all' for every category)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"country" <CODE>)
                        .required(false)
                        .help("App Store country for category feeds (repeatable, default: us gb ca fr de ie nl no ch)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"storefront" <STOREFRONT>)
                        .required(false)
                        .help("Storefront whose listing URLs are followed")
                        .value_parser(STOREFRONTS),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON run configuration; flags override its values")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("CSV file accepted listings are appended to"),
                )
                .arg(
                    arg!(--"max-nodes" <COUNT>)
                        .required(false)
                        .help("Stop after this many pages have been fetched")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"max-depth" <DEPTH>)
                        .required(false)
                        .help("Do not follow links from pages at this depth")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"fanout" <COUNT>)
                        .required(false)
                        .help("Maximum new listings enqueued per page")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"delay-ms" <MILLIS>)
                        .required(false)
                        .help("Minimum time between two fetches")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"target" <COUNT>)
                        .required(false)
                        .help("Stop once this many listings have been saved")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"retries" <COUNT>)
                        .required(false)
                        .help("Retries for transient fetch errors")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    arg!(--"months" <COUNT>)
                        .required(false)
                        .help("Keep listings released within this many calendar months")
                        .value_parser(clap::value_parser!(u32))
                        .conflicts_with("days"),
                )
                .arg(
                    arg!(--"days" <COUNT>)
                        .required(false)
                        .help("Keep listings released within this many days")
                        .value_parser(clap::value_parser!(u32))
                        .conflicts_with("months"),
                )
                .arg(
                    arg!(--"date-format" <FORMAT>)
                        .required(false)
                        .help("strftime format of the release date (default depends on storefront)"),
                )
                .arg(
                    arg!(--"min-installs" <COUNT>)
                        .required(false)
                        .help("Keep listings with at least this many installs, e.g. 5K")
                        .conflicts_with("max-installs"),
                )
                .arg(
                    arg!(--"max-installs" <COUNT>)
                        .required(false)
                        .help("Keep listings with at most this many installs, e.g. 1M")
                        .conflicts_with("min-installs"),
                )
                .arg(
                    arg!(--"resume")
                        .required(false)
                        .help("Skip listings already present in the output file")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the progress spinner")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"report" <PATH>)
                        .required(false)
                        .help("Save the run report to a file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("merge")
                .about(
                    "Merge freshly crawled records into an existing dataset, deduplicated by \
                listing identity.",
                )
                .arg(
                    arg!(-b --"base" <URL_OR_PATH>)
                        .required(false)
                        .help("Existing dataset to merge into (http(s) URL or file)"),
                )
                .arg(
                    arg!(--"fresh" <PATH>)
                        .required(false)
                        .help("Freshly crawled CSV file (default: the storefront's crawl output)"),
                )
                .arg(
                    arg!(--"storefront" <STOREFRONT>)
                        .required(false)
                        .help("Storefront whose default crawl output is merged")
                        .value_parser(STOREFRONTS)
                        .default_value("google_play"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the merged file (default: overwrite the fresh file)"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout for downloading a remote base dataset")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("categories")
                .about("List the categories usable as crawl seeds")
                .arg(
                    arg!(--"storefront" <STOREFRONT>)
                        .required(false)
                        .help("Storefront to list categories for")
                        .value_parser(STOREFRONTS)
                        .default_value("google_play"),
                ),
        )
}
