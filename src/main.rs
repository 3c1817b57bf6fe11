mod cli;

use clap::Parser;
use cli::Cli;
use colored::*;
use env_logger::{Builder, Env, Target};
use log::info;
use std::fs;
use std::io::{self, BufRead};
use treefind::{
    merge_spans, InputCollaborator, Key, MemoryTree, Result, RowId, SearchEngine,
    SearchOption, SearchSettings, TreeCollaborator, TreefindError,
};

/// Console stand-in for a search box: messages go to stderr.
#[derive(Debug, Default)]
struct ConsoleInput {
    text: String,
    message_shown: bool,
    summary: String,
}

impl InputCollaborator for ConsoleInput {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn clear(&mut self) {
        self.text.clear();
    }

    fn show_message(&mut self, message: &str) {
        eprintln!("{} {}", "Warning:".yellow().bold(), message);
        self.message_shown = true;
    }

    fn hide_message(&mut self) {
        self.message_shown = false;
    }

    fn is_message_shown(&self) -> bool {
        self.message_shown
    }

    fn set_summary(&mut self, caption: &str) {
        self.summary = caption.to_string();
    }
}

type Engine = SearchEngine<MemoryTree, ConsoleInput>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let settings = build_settings(&cli)?;
    let tree = MemoryTree::load(&cli.tree)?;
    info!(
        "Loaded {} rows in {} columns from {}",
        tree.row_count(),
        tree.column_count(),
        cli.tree.display()
    );

    let mut engine = SearchEngine::new(tree, ConsoleInput::default(), settings)?;

    if cli.interactive {
        run_interactive(&mut engine)?;
    } else {
        let query = cli.query.clone().unwrap_or_default();
        engine.input_mut().text = query;
        match engine.trigger() {
            Ok(_) => print_tree(&engine),
            Err(TreefindError::InvalidInputLength { .. }) => std::process::exit(2),
            Err(e) => return Err(e),
        }
    }

    if cli.metrics {
        println!("\n{}", engine.metrics().gather());
    }

    Ok(())
}

fn build_settings(cli: &Cli) -> Result<SearchSettings> {
    let mut settings = match &cli.config {
        Some(path) => SearchSettings::from_path(path)?,
        None => SearchSettings::load()?,
    };

    if let Some(columns) = &cli.columns {
        settings.search_columns = columns.iter().copied().collect();
    }
    if let Some(min) = cli.min_length {
        settings.set_min_request_length(min);
    }
    if let Some(max) = cli.max_length {
        settings.set_max_request_length(max);
    }
    if let Some(delay) = cli.delay {
        settings.set_input_delay(delay);
    }
    if cli.no_expand {
        settings.options.remove(SearchOption::AutoExpandNodes);
    }
    if cli.no_relevant_sort {
        settings.options.remove(SearchOption::RelevantSort);
    }

    settings.validate()?;
    Ok(settings)
}

fn run_interactive(engine: &mut Engine) -> Result<()> {
    println!(
        "{}",
        "Type a query and press Enter; an empty line resets.".dimmed()
    );
    engine.reset_search_results();
    print_tree(engine);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        engine.input_mut().text = line.trim_end().to_string();
        engine.on_text_changed();

        let Some(last) = engine.input().text.chars().last() else {
            print_tree(engine);
            continue;
        };

        match engine.on_key_up(Key::Char(last)) {
            Ok(()) => {}
            Err(TreefindError::InvalidInputLength { .. }) => continue,
            Err(e) => return Err(e),
        }

        if !engine.is_armed() {
            // button-click mode never arms the timer
            engine.trigger()?;
            print_tree(engine);
            continue;
        }

        while let Some(delay) = engine.pending_delay() {
            std::thread::sleep(delay);
            if engine.tick()?.is_some() {
                print_tree(engine);
            }
        }
    }

    Ok(())
}

fn print_tree(engine: &Engine) {
    let tree = engine.tree();
    for row in tree.roots() {
        if tree.is_visible(row) {
            print_row(engine, row);
        }
    }
    println!("{} {}", "Total:".green(), engine.input().summary);
}

fn print_row(engine: &Engine, row: RowId) {
    let tree = engine.tree();
    let depth = tree.depth(row);
    let has_children = tree.first_child(row).is_some();
    let marker = match (has_children, tree.is_expanded(row)) {
        (false, _) => " ",
        (true, true) => "-",
        (true, false) => "+",
    };

    let cells: Vec<String> = (0..tree.column_count())
        .map(|column| highlight(&tree.cell_text(row, column), &engine.highlight_cell(row, column)))
        .collect();

    let mut line = format!("{}{} {}", "  ".repeat(depth), marker, cells.join(" | "));
    let matches = engine.matches_for(row);
    if !engine.words().is_empty() && matches.is_match() {
        line.push_str(&format!(
            " {}",
            format!("[{} word(s), weight {}]", matches.words, matches.total).dimmed()
        ));
    }
    println!("{line}");

    if tree.is_expanded(row) {
        for child in tree.child_rows(row) {
            if tree.is_visible(child) {
                print_row(engine, child);
            }
        }
    }
}

fn highlight(text: &str, spans: &[treefind::Span]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in merge_spans(spans) {
        out.push_str(&text[cursor..span.start]);
        out.push_str(&text[span.start..span.end()].black().on_yellow().to_string());
        cursor = span.end();
    }
    out.push_str(&text[cursor..]);
    out
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| TreefindError::Other(e.to_string()))?;
    Ok(())
}
