use codetender_core::RunStats;

pub fn splash() {
    println!();
    println!("  _____        __    __              __       ");
    println!(" / ___/__  ___/ /__ / /____ ___  ___/ /__ ____");
    println!("/ /__/ _ \\/ _  / -_) __/ -_) _ \\/ _  / -_) __/");
    println!("\\___/\\___/\\_,_/\\__/\\__/\\__/_//_/\\_,_/\\__/_/   ");
}

pub fn oops() {
    println!("                          __");
    println!("  ____  ____  ____  _____/ /");
    println!(" / __ \\/ __ \\/ __ \\/ ___/ /");
    println!("/ /_/ / /_/ / /_/ (__  )_/");
    println!("\\____/\\____/ .___/____(_)");
    println!("          /_/ ");
}

pub fn print_stats(stats: &RunStats, verbose: bool) {
    println!();
    print!("{}", format_stats(stats, verbose));
}

pub fn print_banner(banner: &[String]) {
    if banner.is_empty() {
        return;
    }
    println!();
    print!("{}", format_banner(banner));
}

fn format_stats(stats: &RunStats, verbose: bool) -> String {
    if stats.tokens.is_empty() {
        return "No tokens specified.\n".to_string();
    }

    let mut out = String::new();
    out.push_str("Successfully replaced the following tokens where found:\n");
    out.push_str("pattern -> replacement (content matches/files/renames)\n");
    out.push_str("------------------------------------------------------\n");
    for token in &stats.tokens {
        out.push_str(&format!(
            "{} -> {} ({}/{}/{})\n",
            token.original_pattern,
            token.replacement,
            token.match_count,
            token.files_touched,
            token.rename_count
        ));
        if verbose {
            for file in &token.matched_files {
                out.push_str(&format!("  {} ({})\n", file.file.display(), file.count));
            }
            for renamed in &token.renamed_paths {
                out.push_str(&format!("  {} -> {}\n", renamed.old, renamed.new));
            }
        }
    }
    out.push('\n');
    out.push_str(&format!("  Total matches: {}\n", stats.total_matches()));
    out.push_str(&format!("  Files processed: {}\n", stats.files_processed));
    out.push_str(&format!("  Content changes: {}\n", stats.content_changes));
    out.push_str(&format!("  Paths renamed: {}\n", stats.paths_renamed));
    out
}

fn format_banner(banner: &[String]) -> String {
    banner.iter().map(|line| format!("{}\n", line)).collect()
}
