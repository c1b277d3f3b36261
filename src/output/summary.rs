use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::metrics::AnalyzedPr;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Overall stats for the fetched set: totals and averages.
pub fn format_summary(repo: &str, prs: &[AnalyzedPr], use_colors: bool) -> String {
    if prs.is_empty() {
        return format!("No pull requests found in {}.", repo);
    }

    let count = prs.len() as f64;
    let avg = |f: &dyn Fn(&AnalyzedPr) -> f64| prs.iter().map(f).sum::<f64>() / count;

    let avg_days = avg(&|pr| pr.time_open_days());
    let avg_files = avg(&|pr| pr.record.changed_files as f64);
    let avg_behind = avg(&|pr| pr.record.commits_behind as f64);
    let avg_lines = avg(&|pr| pr.metrics.lines_changed as f64);
    let avg_comments = avg(&|pr| pr.metrics.total_comments as f64);
    let avg_labels = avg(&|pr| pr.record.labels.len() as f64);
    let merged = prs.iter().filter(|pr| pr.metrics.is_merged).count();

    let header = format!("{} pull requests in {} ({} merged)", prs.len(), repo, merged);
    let header = if use_colors {
        header.bold().to_string()
    } else {
        header
    };

    format!(
        "{}\n  Average time open:      {}\n  Average changed files:  {:.1}\n  Average commits behind: {:.1}\n  Average lines changed:  {:.1}\n  Average comments:       {:.1}\n  Average labels:         {:.1}",
        header,
        format_days(avg_days),
        avg_files,
        avg_behind,
        avg_lines,
        avg_comments,
        avg_labels,
    )
}

/// Top-N lists for triage: furthest behind main, largest churn, longest open.
pub fn format_top_lists(prs: &[AnalyzedPr], n: usize, use_colors: bool) -> String {
    if prs.is_empty() {
        return String::new();
    }

    let mut sections = Vec::new();

    sections.push(format_section(
        "Furthest behind main",
        top_by(prs, n, |pr| pr.record.commits_behind),
        |pr| format!("{} commits behind", pr.record.commits_behind),
        use_colors,
    ));
    sections.push(format_section(
        "Most lines changed",
        top_by(prs, n, |pr| pr.metrics.lines_changed),
        |pr| format!("{} lines", pr.metrics.lines_changed),
        use_colors,
    ));
    sections.push(format_section(
        "Longest open",
        top_by(prs, n, |pr| pr.metrics.time_open.num_seconds().max(0) as u64),
        |pr| format_days(pr.time_open_days()),
        use_colors,
    ));
    // Unlabeled PRs have slipped past triage; surface the least-labeled ones.
    sections.push(format_section(
        "Fewest labels",
        bottom_by(prs, n, |pr| pr.record.labels.len()),
        |pr| format!("{} labels", pr.record.labels.len()),
        use_colors,
    ));

    sections.join("\n\n")
}

fn top_by<K: Ord>(prs: &[AnalyzedPr], n: usize, key: impl Fn(&AnalyzedPr) -> K) -> Vec<&AnalyzedPr> {
    let mut sorted: Vec<&AnalyzedPr> = prs.iter().collect();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)).then(a.record.number.cmp(&b.record.number)));
    sorted.truncate(n);
    sorted
}

fn bottom_by<K: Ord>(prs: &[AnalyzedPr], n: usize, key: impl Fn(&AnalyzedPr) -> K) -> Vec<&AnalyzedPr> {
    let mut sorted: Vec<&AnalyzedPr> = prs.iter().collect();
    sorted.sort_by(|a, b| key(a).cmp(&key(b)).then(a.record.number.cmp(&b.record.number)));
    sorted.truncate(n);
    sorted
}

fn format_section(
    title: &str,
    prs: Vec<&AnalyzedPr>,
    detail: impl Fn(&AnalyzedPr) -> String,
    use_colors: bool,
) -> String {
    let title = if use_colors {
        title.bold().underline().to_string()
    } else {
        title.to_string()
    };

    let lines: Vec<String> = prs
        .iter()
        .map(|pr| {
            let number = format!("#{}", pr.record.number);
            let number = if use_colors {
                number.cyan().to_string()
            } else {
                number
            };
            format!(
                "  {:>6}  {:<50}  {}",
                number,
                truncate(&pr.record.title, 50),
                detail(pr)
            )
        })
        .collect();

    format!("{}\n{}", title, lines.join("\n"))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Render fractional days with a humantime duration, truncated to minutes.
fn format_days(days: f64) -> String {
    let secs = (days * 86_400.0).max(0.0) as u64;
    let truncated = std::time::Duration::from_secs(secs - secs % 60);
    humantime::format_duration(truncated).to_string()
}
