use std::path::PathBuf;

use picpad::config::{ConfigFlags, load_config_flags, parse_flag_tokens, save_config_flags};
use picpad::document::RescanPolicy;
use picpad::geometry::PageSize;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".picpadrc");
    let content = r#"
# comment
--no-images

--page letter
   
--log-file=picpad.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.no_images);
    assert_eq!(flags.page, Some(PageSize::Letter));
    assert_eq!(flags.log_file, Some(PathBuf::from("picpad.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".picpadrc");
    let content = "--no-images\n--page a3\n--image cat.png\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "picpad".to_string(),
        "--page".to_string(),
        "a4".to_string(),
        "--force-half-cell".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.no_images, "file flags should remain enabled");
    assert!(effective.force_half_cell, "cli flags should be applied");
    assert_eq!(effective.page, Some(PageSize::A4), "cli should override page");
    assert_eq!(
        effective.image,
        Some(PathBuf::from("cat.png")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "picpad".to_string(),
        "--rescan=shrink".to_string(),
        "--image=pictures/dog.jpg".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.rescan, Some(RescanPolicy::ShrinkHeuristic));
    assert_eq!(flags.image, Some(PathBuf::from("pictures/dog.jpg")));
}

#[test]
fn test_saved_flags_survive_reload_and_merge() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config");
    let local = dir.path().join(".picpadrc");
    save_config_flags(
        &global,
        &ConfigFlags {
            page: Some(PageSize::A3),
            rescan: Some(RescanPolicy::EveryEdit),
            ..ConfigFlags::default()
        },
    )
    .unwrap();
    std::fs::write(&local, "--rescan shrink\n--force-half-cell\n").unwrap();

    let merged = load_config_flags(&global)
        .unwrap()
        .union(&load_config_flags(&local).unwrap());
    assert_eq!(merged.page, Some(PageSize::A3));
    assert_eq!(merged.rescan, Some(RescanPolicy::ShrinkHeuristic));
    assert!(merged.force_half_cell);
    assert!(!merged.no_images);
}
