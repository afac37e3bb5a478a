//! Build script that assembles the split UI source files into a single
//! `src/ui.html` file. The server embeds this via `include_str!("ui.html")`.

use std::fs;
use std::path::Path;

fn main() {
    let ui_dir = Path::new("src/ui");
    let output = Path::new("src/ui.html");

    // Re-run if any source file changes
    println!("cargo::rerun-if-changed=src/ui/");

    let read = |name: &str| {
        let path = ui_dir.join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read UI source {}: {}", path.display(), e))
    };

    let css = read("styles.css");
    let js_files = ["api.js", "figures.js", "app.js"];

    let js: String = js_files
        .iter()
        .map(|f| read(f))
        .collect::<Vec<_>>()
        .join("\n");

    let html = read("index.html");
    let result = format!(
        "<!-- GENERATED FILE, DO NOT EDIT. Edit files in src/ui/ instead. -->\n{}",
        html.replace("/* __STYLES__ */", &css)
            .replace("/* __SCRIPTS__ */", &js),
    );

    // Only write if content changed (avoids unnecessary recompilation)
    let current = fs::read_to_string(output).unwrap_or_default();
    if current != result {
        fs::write(output, result).expect("failed to write src/ui.html");
    }
}
