use tpm_report::markdown::{PLACEHOLDER, normalize};

#[test]
fn absent_or_blank_input_becomes_placeholder() {
    assert_eq!(normalize(None), PLACEHOLDER);
    assert_eq!(normalize(Some("")), PLACEHOLDER);
    assert_eq!(normalize(Some("  \n\t ")), PLACEHOLDER);
}

#[test]
fn heading_markers_get_a_space() {
    assert_eq!(normalize(Some("##Title")), "## Title");
    assert_eq!(normalize(Some("###Deep")), "### Deep");
    assert_eq!(normalize(Some("## Already")), "## Already");
    // A lone '#' is left alone.
    assert_eq!(normalize(Some("#hashtag")), "#hashtag");
}

#[test]
fn dash_bullets_get_a_space() {
    assert_eq!(normalize(Some("-first\n-second")), "- first\n- second");
    assert_eq!(normalize(Some("- fine")), "- fine");
    assert_eq!(normalize(Some("a-b")), "a-b");
}

#[test]
fn dash_rules_are_not_bullets() {
    assert_eq!(normalize(Some("above\n\n---\n\nbelow")), "above\n\n---\n\nbelow");
    assert_eq!(normalize(Some("-")), "-");
}

#[test]
fn headings_are_separated_from_preceding_text() {
    assert_eq!(normalize(Some("intro\n## Next")), "intro\n\n## Next");
    assert_eq!(normalize(Some("intro\n\n## Next")), "intro\n\n## Next");
    assert_eq!(normalize(Some("## First\ntext")), "## First\ntext");
}

#[test]
fn every_line_ending_becomes_lf() {
    assert_eq!(normalize(Some("a\r\r\nb")), "a\n\nb");
    assert_eq!(normalize(Some("a\rb")), "a\nb");
}

#[test]
fn rules_combine() {
    assert_eq!(
        normalize(Some("Summary\r\n##Goals\r\n-fast\r\n-cheap")),
        "Summary\n\n## Goals\n- fast\n- cheap"
    );
}

#[test]
fn normalize_is_idempotent() {
    let samples = [
        "plain text",
        "Summary\r\n##Goals\r\n-fast\r\n-cheap",
        "###x\n-##y\n---\n- z",
        "a\n##b\n##c\n\n\n##d",
        "**bold** and _it_",
        "a\r\r\nb",
        "a\rb",
        "x\r\n\r##y",
    ];
    for sample in samples {
        let once = normalize(Some(sample));
        let twice = normalize(Some(&once));
        assert_eq!(once, twice, "not idempotent for {sample:?}");
    }
    assert_eq!(normalize(Some(PLACEHOLDER)), PLACEHOLDER);
}
