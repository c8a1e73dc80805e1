use appscout::commands::command_argument_builder;
use appscout::handlers::{
    handle_categories, handle_crawl, handle_merge, init_tracing, print_banner,
};
use colored::Colorize;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let Some((name, sub_matches)) = chosen_command.subcommand() else {
        // No subcommand provided, just show the banner
        return;
    };

    init_tracing(chosen_command.get_flag("verbose") || sub_matches.get_flag("verbose"));

    let result = match name {
        "crawl" => handle_crawl(sub_matches).await,
        "merge" => handle_merge(sub_matches).await,
        "categories" => handle_categories(sub_matches),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
