use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

// Statement text, model replies and previews are arbitrary UTF-8. Slicing a
// `str` with a literal byte range (`text[..50]`, `reply[3..]`) panics when the
// boundary lands inside a multi-byte character, so source files must not
// contain such slices. Ranges ending in a variable (`&buf[..n]`) are allowed.

fn visit_rs_files(dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("read_dir failed: {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            visit_rs_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
    Ok(())
}

#[test]
fn no_literal_byte_index_string_slices() -> anyhow::Result<()> {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");

    // `[..123]`, `[123..]`, `[1..23]`
    let re_trailing = Regex::new(r"\[\s*\d*\s*\.\.=?\s*\d+\s*\]")?;
    let re_leading = Regex::new(r"\[\s*\d+\s*\.\.\s*\]")?;
    let mut failures: Vec<String> = Vec::new();

    let mut files: Vec<PathBuf> = Vec::new();
    visit_rs_files(&src_dir, &mut files)?;

    for path in files {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        for (i, line) in text.lines().enumerate() {
            if line.trim_start().starts_with("//") {
                continue;
            }
            if re_trailing.is_match(line) || re_leading.is_match(line) {
                failures.push(format!("{}:{}: {}", path.display(), i + 1, line.trim()));
            }
        }
    }

    if !failures.is_empty() {
        anyhow::bail!(
            "Found literal-range slices in source files:\n{}",
            failures.join("\n")
        );
    }

    Ok(())
}
