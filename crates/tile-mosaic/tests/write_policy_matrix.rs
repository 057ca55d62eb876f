//! Write decisions for every policy, on flags and on a real directory.

use test_utils::{filled, with_spot, TileDir};
use tile_mosaic::{is_empty, TileInput, TileWritingPolicy, WriteDecision, FILL_VALUE};

#[test]
fn test_sixteen_combinations() {
    use TileWritingPolicy::*;
    use WriteDecision::*;

    let cases = [
        // policy, exists, empty, decision
        (Overwrite, false, false, Write),
        (Overwrite, false, true, Write),
        (Overwrite, true, false, Write),
        (Overwrite, true, true, Write),
        (WriteNewsOnly, false, false, Write),
        (WriteNewsOnly, false, true, Write),
        (WriteNewsOnly, true, false, SkipExisting),
        (WriteNewsOnly, true, true, SkipExisting),
        (WriteNewsNonempty, false, false, Write),
        (WriteNewsNonempty, false, true, SkipEmpty),
        (WriteNewsNonempty, true, false, SkipExisting),
        (WriteNewsNonempty, true, true, SkipExisting),
        (NoWrite, false, false, Disabled),
        (NoWrite, false, true, Disabled),
        (NoWrite, true, false, Disabled),
        (NoWrite, true, true, Disabled),
    ];

    for (policy, exists, empty, expected) in cases {
        assert_eq!(
            policy.decide(exists, empty),
            expected,
            "{} exists={} empty={}",
            policy,
            exists,
            empty
        );
        assert_eq!(policy.should_write(exists, empty), expected == Write);
    }
}

#[test]
fn test_existing_file_skipped_unless_overwrite() {
    let dir = TileDir::new().unwrap();
    dir.touch("L0/0_0.png").unwrap();
    let existing = dir.input("L0/0_0.png");
    let missing = dir.input("L0/1_0.png");

    assert_eq!(
        TileWritingPolicy::WriteNewsOnly.check_output(&existing),
        WriteDecision::SkipExisting
    );
    assert!(TileWritingPolicy::WriteNewsOnly.needs_write(&missing));
    assert!(TileWritingPolicy::WriteNewsNonempty.needs_write(&missing));
    assert!(TileWritingPolicy::Overwrite.needs_write(&existing));
    assert!(!TileWritingPolicy::NoWrite.needs_write(&missing));
}

#[test]
fn test_directory_is_not_an_existing_tile() {
    let dir = TileDir::new().unwrap();
    dir.mkdir("L0/0_0.png").unwrap();
    assert!(TileWritingPolicy::WriteNewsOnly.needs_write(&dir.input("L0/0_0.png")));
}

#[test]
fn test_non_file_inputs_always_new() {
    for input in [
        TileInput::url("https://tiles.example.org/0/0/0.png"),
        TileInput::named("bucket/key"),
    ] {
        assert_eq!(
            TileWritingPolicy::WriteNewsOnly.check_output(&input),
            WriteDecision::Write
        );
    }
}

#[test]
fn test_resumable_run() {
    let dir = TileDir::new().unwrap();
    let names: Vec<String> = (0..6).map(|i| format!("t_{}.png", i)).collect();
    for name in &names[..4] {
        dir.touch(name).unwrap();
    }
    let pending: Vec<&String> = names
        .iter()
        .filter(|name| TileWritingPolicy::WriteNewsOnly.needs_write(&dir.input(name)))
        .collect();
    assert_eq!(pending, vec!["t_4.png", "t_5.png"]);
}

#[test]
fn test_empty_detection_feeds_decision() {
    let blank = filled(16, 16, 3, FILL_VALUE);
    let content = with_spot(16, 16, 3, FILL_VALUE, 42, 7, 9);
    let policy = TileWritingPolicy::WriteNewsNonempty;

    assert_eq!(
        policy.decide(false, is_empty(&blank, FILL_VALUE)),
        WriteDecision::SkipEmpty
    );
    assert_eq!(
        policy.decide(false, is_empty(&content, FILL_VALUE)),
        WriteDecision::Write
    );
}
