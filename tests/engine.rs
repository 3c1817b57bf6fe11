use std::time::Duration;
use treefind::{
    BufferedInput, InputCollaborator, Key, LengthBound, ManualClock, Matches, MemoryTree, RowId,
    SearchEngine, SearchOption, SearchSettings, SortDirection, Span, TreeCollaborator,
    TreefindError,
};

struct Rows {
    animals: RowId,
    mammals: RowId,
    cat: RowId,
    dog: RowId,
    birds: RowId,
    plants: RowId,
    tree: RowId,
    minerals: RowId,
}

fn sample_tree() -> (MemoryTree, Rows) {
    let mut tree = MemoryTree::with_columns(["name", "note"]);
    let animals = tree.add_row(None, ["Animals", ""]);
    let mammals = tree.add_row(Some(animals), ["Mammals", "warm blooded"]);
    let cat = tree.add_row(Some(mammals), ["Cat", "says meow"]);
    let dog = tree.add_row(Some(mammals), ["Dog", "says woof"]);
    let birds = tree.add_row(Some(animals), ["Birds", "feathers"]);
    let plants = tree.add_row(None, ["Plants", "green"]);
    let tree_row = tree.add_row(Some(plants), ["Tree", "tall plant"]);
    let minerals = tree.add_row(None, ["Minerals", "rocks"]);

    (
        tree,
        Rows {
            animals,
            mammals,
            cat,
            dog,
            birds,
            plants,
            tree: tree_row,
            minerals,
        },
    )
}

fn engine_with(settings: SearchSettings) -> (SearchEngine<MemoryTree, BufferedInput>, Rows) {
    let (tree, rows) = sample_tree();
    let engine = SearchEngine::new(tree, BufferedInput::new(), settings).unwrap();
    (engine, rows)
}

fn search(engine: &mut SearchEngine<MemoryTree, BufferedInput>, query: &str) {
    engine.input_mut().set_text(query);
    engine.trigger().unwrap();
}

#[test]
fn test_deep_match_expands_ancestors() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    search(&mut engine, "cat");

    let tree = engine.tree();
    assert!(tree.is_expanded(rows.mammals));
    assert!(tree.is_expanded(rows.animals));
    assert!(tree.is_visible(rows.animals));
    assert!(!tree.is_visible(rows.plants));
    assert!(!tree.is_visible(rows.minerals));
    assert!(!tree.is_expanded(rows.dog));

    assert_eq!(engine.matches_for(rows.cat), Matches::new(3, 1));
    assert_eq!(engine.matches_for(rows.animals), Matches::new(3, 1));
    assert_eq!(engine.matches_for(rows.plants), Matches::NONE);
    assert_eq!(engine.input().summary(), "5 of 8");
    assert!(!tree.is_updating());
}

#[test]
fn test_subtree_aggregate_sums_totals_and_maxes_words() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    search(&mut engine, "says meow");

    assert_eq!(engine.matches_for(rows.cat), Matches::new(8, 2));
    assert_eq!(engine.matches_for(rows.dog), Matches::new(4, 1));
    assert_eq!(engine.matches_for(rows.mammals), Matches::new(12, 2));
    assert_eq!(engine.matches_for(rows.animals), Matches::new(12, 2));
    assert_eq!(engine.matches_for(rows.birds), Matches::NONE);
}

#[test]
fn test_non_matching_rows_are_collapsed() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    engine.tree_mut().set_expanded(rows.birds, true);
    engine.tree_mut().set_expanded(rows.plants, true);

    search(&mut engine, "dog");

    let tree = engine.tree();
    assert!(!tree.is_expanded(rows.birds));
    assert!(tree.is_expanded(rows.mammals));
    // top-level rows are never collapsed by the walk
    assert!(tree.is_expanded(rows.plants));
}

#[test]
fn test_without_auto_expand_leaves_expansion_alone() {
    let mut settings = SearchSettings::default();
    settings.options.remove(SearchOption::AutoExpandNodes);
    let (mut engine, rows) = engine_with(settings);

    search(&mut engine, "cat");

    let tree = engine.tree();
    assert!(!tree.is_expanded(rows.mammals));
    assert!(!tree.is_expanded(rows.animals));
    assert!(tree.is_visible(rows.animals));
}

#[test]
fn test_relevant_sort_ranks_words_then_total() {
    let (mut engine, rows) = engine_with(SearchSettings::default());

    search(&mut engine, "plant says");
    // Plants (10, 1) beats Animals (8, 1) on total
    assert_eq!(
        engine.tree().roots(),
        vec![rows.plants, rows.animals, rows.minerals]
    );

    search(&mut engine, "plant says meow");
    // Animals (12, 2) beats Plants (10, 1) on distinct words
    assert_eq!(
        engine.tree().roots(),
        vec![rows.animals, rows.plants, rows.minerals]
    );
    assert_eq!(engine.tree().child_rows(rows.mammals), vec![rows.cat, rows.dog]);
}

#[test]
fn test_relevant_sort_disabled_keeps_order() {
    let mut settings = SearchSettings::default();
    settings.options.remove(SearchOption::RelevantSort);
    let (mut engine, rows) = engine_with(settings);

    search(&mut engine, "plant says");
    assert_eq!(
        engine.tree().roots(),
        vec![rows.animals, rows.plants, rows.minerals]
    );
}

#[test]
fn test_compare_rows_most_relevant_first() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    search(&mut engine, "plant says");

    assert_eq!(
        engine.compare_rows(rows.plants, rows.animals),
        std::cmp::Ordering::Less
    );
    assert_eq!(
        engine.compare_rows(rows.minerals, rows.animals),
        std::cmp::Ordering::Greater
    );
}

#[test]
fn test_empty_query_resets_everything() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    search(&mut engine, "cat");
    assert!(!engine.match_table().is_empty());

    engine.input_mut().set_text("");
    engine.on_text_changed();

    let tree = engine.tree();
    assert!(tree.all_rows().iter().all(|&row| tree.is_visible(row)));
    assert!(tree.all_rows().iter().all(|&row| !tree.is_expanded(row)));
    assert!(engine.match_table().is_empty());
    assert!(engine.words().is_empty());
    assert_eq!(engine.input().summary(), "8");
    assert_eq!(tree.roots(), vec![rows.animals, rows.plants, rows.minerals]);
}

#[test]
fn test_delimiter_only_query_behaves_like_empty() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    search(&mut engine, "cat");

    let summary = {
        engine.input_mut().set_text(" ., ");
        engine.process_request().unwrap()
    };
    assert_eq!(summary.visible, 8);
    assert!(engine.tree().is_visible(rows.minerals));
    assert!(engine.match_table().is_empty());
}

#[test]
fn test_clear_button_resets() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    search(&mut engine, "cat");

    engine.on_clear_clicked();
    assert_eq!(engine.input().text(), "");
    assert!(engine.tree().is_visible(rows.plants));
    assert!(engine.match_table().is_empty());
}

#[test]
fn test_short_request_is_rejected_without_side_effects() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    search(&mut engine, "cat");
    let before = engine.matches_for(rows.animals);
    let entries = engine.match_table().len();

    engine.input_mut().set_text("c");
    let err = engine.on_key_up(Key::Char('c')).unwrap_err();
    match err {
        TreefindError::InvalidInputLength { bound, len } => {
            assert_eq!(bound, LengthBound::TooShort { min: 2 });
            assert_eq!(len, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(!engine.is_armed());
    assert_eq!(engine.match_table().len(), entries);
    assert_eq!(engine.matches_for(rows.animals), before);
    assert_eq!(
        engine.input().message(),
        Some("Minimal length of search request is: 2")
    );
}

#[test]
fn test_rejected_request_cancels_pending_search() {
    let (tree, _) = sample_tree();
    let clock = ManualClock::new();
    let mut engine = SearchEngine::builder()
        .tree(tree)
        .input(BufferedInput::new())
        .clock(clock.clone())
        .build()
        .unwrap();

    engine.input_mut().set_text("ca");
    engine.on_key_up(Key::Char('a')).unwrap();
    assert!(engine.is_armed());

    engine.input_mut().set_text("d");
    assert!(engine.on_key_up(Key::Backspace).is_err());
    assert!(!engine.is_armed());

    clock.advance(Duration::from_millis(300));
    assert_eq!(engine.tick().unwrap(), None);
    assert!(engine.words().is_empty());
    assert!(engine.match_table().is_empty());
    assert_eq!(engine.metrics().cycles_completed.get(), 0);
}

#[test]
fn test_no_matches_hides_everything() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    engine.input_mut().set_text("zzz");
    let summary = engine.trigger().unwrap();

    assert_eq!(summary.to_string(), "0 of 8");
    assert_eq!(engine.input().summary(), "0 of 8");
    let tree = engine.tree();
    assert!(tree.roots().iter().all(|&row| !tree.is_visible(row)));
    for row in [rows.animals, rows.cat, rows.tree, rows.minerals] {
        assert_eq!(engine.matches_for(row), Matches::NONE);
        assert!(engine.highlight_cell(row, 0).is_empty());
        assert!(engine.highlight_cell(row, 1).is_empty());
    }
}

#[test]
fn test_long_request_is_rejected() {
    let mut settings = SearchSettings::default();
    settings.set_request_limits(2, 5);
    let (mut engine, _) = engine_with(settings);

    engine.input_mut().set_text("abcdef");
    assert!(matches!(
        engine.on_key_up(Key::Char('f')),
        Err(TreefindError::InvalidInputLength {
            bound: LengthBound::TooLong { max: 5 },
            ..
        })
    ));
    assert!(engine.input().message().unwrap().contains("(5)"));
    assert!(!engine.is_armed());

    // a valid request hides the message again
    engine.input_mut().set_text("abc");
    engine.on_key_up(Key::Char('c')).unwrap();
    assert!(engine.input().message().is_none());
    assert!(engine.is_armed());
}

#[test]
fn test_ignored_keys_do_not_arm() {
    let (mut engine, _) = engine_with(SearchSettings::default());
    engine.input_mut().set_text("cat");

    engine.on_key_up(Key::Function(3)).unwrap();
    engine.on_key_up(Key::Enter).unwrap();
    assert!(!engine.is_armed());

    engine.on_key_up(Key::Backspace).unwrap();
    assert!(engine.is_armed());
}

#[test]
fn test_debounce_coalesces_keystrokes() {
    let (tree, rows) = sample_tree();
    let clock = ManualClock::new();
    let mut engine = SearchEngine::builder()
        .tree(tree)
        .input(BufferedInput::new())
        .clock(clock.clone())
        .build()
        .unwrap();

    for c in "cat".chars() {
        engine.input_mut().push(c);
        let _ = engine.on_key_up(Key::Char(c));
        clock.advance(Duration::from_millis(100));
        assert_eq!(engine.tick().unwrap(), None);
    }

    // last keystroke was 100 ms ago
    clock.advance(Duration::from_millis(199));
    assert_eq!(engine.tick().unwrap(), None);
    clock.advance(Duration::from_millis(1));
    let summary = engine.tick().unwrap().expect("search should fire");

    assert_eq!(summary.to_string(), "5 of 8");
    assert!(engine.tree().is_expanded(rows.mammals));
    assert_eq!(engine.metrics().cycles_completed.get(), 1);
    assert_eq!(engine.metrics().timer_restarts.get(), 1);
    assert_eq!(engine.tick().unwrap(), None);
}

#[test]
fn test_reset_cancels_pending_search() {
    let (tree, _) = sample_tree();
    let clock = ManualClock::new();
    let mut engine = SearchEngine::builder()
        .tree(tree)
        .input(BufferedInput::new())
        .clock(clock.clone())
        .build()
        .unwrap();

    engine.input_mut().set_text("cat");
    engine.on_key_up(Key::Char('t')).unwrap();
    engine.on_clear_clicked();

    clock.advance(Duration::from_secs(1));
    assert_eq!(engine.tick().unwrap(), None);
    assert_eq!(engine.metrics().cycles_completed.get(), 0);
}

#[test]
fn test_engines_keep_separate_timers() {
    let clock = ManualClock::new();
    let build = |delay| {
        let (tree, _) = sample_tree();
        let mut settings = SearchSettings::default();
        settings.set_input_delay(delay);
        SearchEngine::builder()
            .tree(tree)
            .input(BufferedInput::new())
            .settings(settings)
            .clock(clock.clone())
            .build()
            .unwrap()
    };
    let mut first = build(100);
    let mut second = build(300);

    first.input_mut().set_text("cat");
    first.on_key_up(Key::Char('t')).unwrap();
    second.input_mut().set_text("dog");
    second.on_key_up(Key::Char('g')).unwrap();

    clock.advance(Duration::from_millis(100));
    assert!(first.tick().unwrap().is_some());
    assert!(second.tick().unwrap().is_none());
    clock.advance(Duration::from_millis(200));
    assert!(second.tick().unwrap().is_some());
}

#[test]
fn test_button_mode_never_arms() {
    let mut settings = SearchSettings::default();
    settings
        .options
        .insert(SearchOption::StartSearchAfterButtonClick);
    let (mut engine, rows) = engine_with(settings);

    engine.input_mut().set_text("cat");
    engine.on_key_up(Key::Char('t')).unwrap();
    assert!(!engine.is_armed());
    assert!(engine.tree().is_visible(rows.plants));

    engine.trigger().unwrap();
    assert!(!engine.tree().is_visible(rows.plants));
}

#[test]
fn test_restricted_columns() {
    let mut settings = SearchSettings::default();
    settings.search_columns.insert(1);
    let (mut engine, rows) = engine_with(settings);

    search(&mut engine, "plant");

    // "Plants" in the name column no longer counts
    assert_eq!(engine.matches_for(rows.plants), Matches::new(5, 1));
    assert!(engine.highlight_cell(rows.plants, 0).is_empty());
    assert_eq!(engine.highlight_cell(rows.tree, 1), vec![Span::new(5, 5)]);
    assert_eq!(
        engine.count_matches_in_column(rows.plants, 0).unwrap(),
        Matches::new(5, 1)
    );
}

#[test]
fn test_highlight_uses_active_words() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    assert!(engine.highlight_cell(rows.cat, 1).is_empty());

    search(&mut engine, "SAYS meow");
    assert_eq!(
        engine.highlight_cell(rows.cat, 1),
        vec![Span::new(5, 4), Span::new(0, 4)]
    );
    assert_eq!(engine.spans("Meow meow", 0), vec![Span::new(0, 4), Span::new(5, 4)]);
}

#[test]
fn test_invalid_column_aborts_cycle_and_closes_batch() {
    testing_logger::setup();

    let mut settings = SearchSettings::default();
    settings.search_columns.insert(0).insert(7);
    let (mut engine, rows) = engine_with(settings);

    engine.input_mut().set_text("cat");
    let err = engine.trigger().unwrap_err();
    assert!(matches!(
        err,
        TreefindError::InvalidColumnIndex {
            index: 7,
            column_count: 2
        }
    ));

    assert!(!engine.tree().is_updating());
    assert_eq!(engine.tree().batches_completed(), 1);
    assert!(engine.words().is_empty());
    assert!(engine.match_table().is_empty());
    assert!(!engine.match_table().contains(rows.animals));
    assert_eq!(engine.metrics().cycles_aborted.get(), 1);

    testing_logger::validate(|captured_logs| {
        let errors: Vec<_> = captured_logs
            .iter()
            .filter(|log| log.level == log::Level::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].body.contains("Search cycle aborted"));
    });
}

#[test]
fn test_header_click_sets_natural_order_for_reset() {
    let (mut engine, rows) = engine_with(SearchSettings::default());
    engine.on_header_click(Some(0), SortDirection::Ascending);

    search(&mut engine, "plant says");
    engine.reset_search_results();

    assert_eq!(
        engine.tree().roots(),
        vec![rows.animals, rows.minerals, rows.plants]
    );
    assert_eq!(engine.tree().sort_state().column, Some(0));
}

#[test]
fn test_missing_collaborators() {
    let result = SearchEngine::<MemoryTree, BufferedInput>::builder()
        .input(BufferedInput::new())
        .build();
    assert!(matches!(result, Err(TreefindError::MissingCollaborator("tree"))));

    let result = SearchEngine::<MemoryTree, BufferedInput>::builder()
        .tree(MemoryTree::new(1))
        .build();
    assert!(matches!(result, Err(TreefindError::MissingCollaborator("input"))));
}

#[test]
fn test_inverted_limits_are_rejected_at_build() {
    let mut settings = SearchSettings::default();
    settings.set_request_limits(10, 3);
    let result = SearchEngine::new(MemoryTree::new(1), BufferedInput::new(), settings);
    assert!(matches!(result, Err(TreefindError::Config(_))));
}
