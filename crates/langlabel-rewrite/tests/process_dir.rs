use std::fs;
use std::path::Path;

use langlabel_rewrite::{ProcessError, ProcessOptions, Processor};

const POST: &str = r#"<!DOCTYPE html>
<html>
<head><title>post</title></head>
<body>
<div class="language-yaml highlighter-rouge"><div class="highlight"><pre class="highlight"><code>key: value</code></pre></div></div>
<div class="language-js highlighter-rouge"><div class="highlight"><pre class="highlight"><code>let x = 1;</code></pre></div></div>
<div class="highlighter-rouge"><pre>plain</pre></div>
</body>
</html>
"#;

const PLAIN: &str = "<html><body><p>No code here.</p></body></html>\n";

fn site(root: &Path) {
    fs::create_dir_all(root.join("posts")).unwrap();
    fs::create_dir_all(root.join("assets")).unwrap();
    fs::write(root.join("index.html"), PLAIN).unwrap();
    fs::write(root.join("posts/post.html"), POST).unwrap();
    fs::write(
        root.join("posts/cpp.html"),
        r#"<div class="language-c++ highlighter-rouge"><code>int x;</code></div>"#,
    )
    .unwrap();
    fs::write(root.join("assets/style.css"), "div[data-lang]::before { content: attr(data-lang); }").unwrap();
}

#[test]
fn test_process_in_place() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());

    let stats = Processor::new(ProcessOptions::in_place(dir.path()))
        .process()
        .unwrap();

    assert_eq!(stats.files_processed, 3);
    assert_eq!(stats.files_changed, 2);
    assert_eq!(stats.blocks_labelled, 3);
    assert_eq!(stats.blocks_skipped, 0);
    assert_eq!(stats.languages, vec!["c", "js", "yaml"]);

    let post = fs::read_to_string(dir.path().join("posts/post.html")).unwrap();
    assert!(post.contains(r#"data-lang="yaml""#));
    assert!(post.contains(r#"data-lang="js""#));
    assert_eq!(post.matches("data-lang").count(), 2);

    let cpp = fs::read_to_string(dir.path().join("posts/cpp.html")).unwrap();
    assert!(cpp.contains(r#"data-lang="c""#));

    assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), PLAIN);
}

#[test]
fn test_process_twice_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());

    Processor::new(ProcessOptions::in_place(dir.path()))
        .process()
        .unwrap();
    let first = fs::read_to_string(dir.path().join("posts/post.html")).unwrap();

    let stats = Processor::new(ProcessOptions::in_place(dir.path()))
        .process()
        .unwrap();
    let second = fs::read_to_string(dir.path().join("posts/post.html")).unwrap();

    assert_eq!(first, second);
    assert_eq!(stats.files_changed, 0);
    assert_eq!(stats.blocks_labelled, 3);
}

#[test]
fn test_process_to_output_dir() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_dir = output.path().join("site");
    site(input.path());

    let options = ProcessOptions {
        output_dir: Some(out_dir.clone()),
        ..ProcessOptions::in_place(input.path())
    };
    let stats = Processor::new(options).process().unwrap();
    assert_eq!(stats.blocks_labelled, 3);

    // Input untouched, output labelled, non-HTML assets copied over.
    assert_eq!(
        fs::read_to_string(input.path().join("posts/post.html")).unwrap(),
        POST
    );
    let labelled = fs::read_to_string(out_dir.join("posts/post.html")).unwrap();
    assert!(labelled.contains(r#"data-lang="yaml""#));
    assert!(out_dir.join("assets/style.css").exists());
}

#[test]
fn test_empty_site_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let stats = Processor::new(ProcessOptions::in_place(dir.path()))
        .process()
        .unwrap();
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.blocks_labelled, 0);
    assert!(stats.languages.is_empty());
}

#[test]
fn test_output_aliasing_input_keeps_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("site");
    site(&input);

    let options = ProcessOptions {
        output_dir: Some(input.join("..").join("site")),
        ..ProcessOptions::in_place(&input)
    };
    let stats = Processor::new(options).process().unwrap();

    assert_eq!(stats.blocks_labelled, 3);
    assert_eq!(fs::read_to_string(input.join("index.html")).unwrap(), PLAIN);
    let post = fs::read_to_string(input.join("posts/post.html")).unwrap();
    assert!(post.contains(r#"data-lang="yaml""#));
}

#[test]
fn test_output_inside_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("site");
    site(&input);

    let options = ProcessOptions {
        output_dir: Some(input.join("labelled")),
        ..ProcessOptions::in_place(&input)
    };
    let err = Processor::new(options).process().unwrap_err();

    assert!(matches!(err, ProcessError::OverlappingOutput { .. }));
    assert_eq!(fs::read_to_string(input.join("posts/post.html")).unwrap(), POST);
    assert!(!input.join("labelled").exists());
}
