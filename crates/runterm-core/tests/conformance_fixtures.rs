use std::path::{Path, PathBuf};

use runterm_core::{Attrs, Color, Terminal};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    #[allow(dead_code)]
    description: String,
    /// Input as text (JSON escapes such as `\u001b` for ESC).
    #[serde(default)]
    input: Option<String>,
    /// Input as hex, for byte streams that are not valid UTF-8.
    #[serde(default)]
    input_bytes_hex: Option<String>,
    /// Feed in chunks of this many bytes (0 = one payload).
    #[serde(default)]
    chunk: usize,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    cursor: CursorPos,
    rows: Vec<String>,
    #[serde(default)]
    runs: Vec<RunExpectation>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    read_position: Option<u64>,
    #[serde(default)]
    diagnostics: usize,
}

#[derive(Debug, Deserialize)]
struct CursorPos {
    row: usize,
    col: usize,
}

#[derive(Debug, Deserialize)]
struct RunExpectation {
    row: usize,
    index: usize,
    text: String,
    #[serde(default)]
    fg: Option<Color>,
    #[serde(default)]
    bg: Option<Color>,
    #[serde(default)]
    attrs: Vec<String>,
}

fn attr_flag(name: &str) -> Result<Attrs, String> {
    Ok(match name {
        "bright" => Attrs::BRIGHT,
        "dim" => Attrs::DIM,
        "underline" => Attrs::UNDERLINE,
        "blink" => Attrs::BLINK,
        "reverse" => Attrs::REVERSE,
        "hidden" => Attrs::HIDDEN,
        other => return Err(format!("unknown attribute {other:?} in fixture")),
    })
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, String> {
    let clean: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if clean.len() % 2 != 0 {
        return Err("hex input must have an even number of digits".to_string());
    }
    clean
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            u8::from_str_radix(s, 16).map_err(|e| format!("bad hex {s:?}: {e}"))
        })
        .collect()
}

#[test]
fn screen_conformance_fixtures_replay() -> Result<(), String> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut paths = collect_fixture_paths(&root)?;
    paths.sort();
    if paths.is_empty() {
        return Err(format!("no fixtures found under {}", root.display()));
    }

    let mut failures = Vec::new();
    for path in paths {
        if let Err(err) = run_fixture(&path) {
            failures.push(format!("{}: {err}", path.display()));
        }
    }

    if !failures.is_empty() {
        return Err(format!("fixtures failed:\n{}", failures.join("\n")));
    }

    Ok(())
}

fn collect_fixture_paths(root: &Path) -> Result<Vec<PathBuf>, String> {
    let mut out = Vec::new();
    let rd = std::fs::read_dir(root)
        .map_err(|e| format!("failed to read fixture root {}: {e}", root.display()))?;
    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let sub_rd = std::fs::read_dir(&path)
            .map_err(|e| format!("failed to read fixture dir {}: {e}", path.display()))?;
        for sub_entry in sub_rd.flatten() {
            let sub_path = sub_entry.path();
            if sub_path.extension().and_then(|s| s.to_str()) == Some("json") {
                out.push(sub_path);
            }
        }
    }
    Ok(out)
}

fn run_fixture(path: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let fixture: Fixture = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    let name = fixture.name.as_str();

    let bytes = match (&fixture.input, &fixture.input_bytes_hex) {
        (Some(input), None) => input.as_bytes().to_vec(),
        (None, Some(hex)) => decode_hex(hex)?,
        _ => return Err(format!("{name}: exactly one of input/input_bytes_hex")),
    };

    let mut term = Terminal::new();
    if fixture.chunk == 0 {
        term.feed(&bytes);
    } else {
        for chunk in bytes.chunks(fixture.chunk) {
            term.feed(chunk);
        }
    }

    let screen = term.screen();
    let cursor = screen.cursor();
    let expected = &fixture.expected;
    if cursor.row != expected.cursor.row || cursor.col != expected.cursor.col {
        return Err(format!(
            "{name}: cursor mismatch: got ({},{}), expected ({},{})",
            cursor.row, cursor.col, expected.cursor.row, expected.cursor.col
        ));
    }

    let rows: Vec<String> = screen.rows().iter().map(|row| row.text()).collect();
    if rows != expected.rows {
        return Err(format!(
            "{name}: rows mismatch: got {rows:?}, expected {:?}",
            expected.rows
        ));
    }

    for row in screen.rows() {
        if !row.is_normalized() {
            return Err(format!("{name}: row not normalized: {row:?}"));
        }
    }

    for exp in &expected.runs {
        let run = screen
            .row(exp.row)
            .and_then(|row| row.runs().get(exp.index))
            .ok_or_else(|| format!("{name}: no run {} in row {}", exp.index, exp.row))?;
        if run.text() != exp.text {
            return Err(format!(
                "{name}: run ({},{}) text {:?}, expected {:?}",
                exp.row,
                exp.index,
                run.text(),
                exp.text
            ));
        }
        let style = run.style();
        let mut attrs = Attrs::empty();
        for attr in &exp.attrs {
            attrs |= attr_flag(attr)?;
        }
        if style.fg != exp.fg || style.bg != exp.bg || style.attrs != attrs {
            return Err(format!(
                "{name}: run ({},{}) style {style:?}, expected fg={:?} bg={:?} attrs={attrs:?}",
                exp.row, exp.index, exp.fg, exp.bg
            ));
        }
    }

    if term.title() != expected.title.as_deref() {
        return Err(format!(
            "{name}: title {:?}, expected {:?}",
            term.title(),
            expected.title
        ));
    }

    if term.read_position() != expected.read_position {
        return Err(format!(
            "{name}: read position {:?}, expected {:?}",
            term.read_position(),
            expected.read_position
        ));
    }

    let diagnostics = term.drain_diagnostics();
    if diagnostics.len() != expected.diagnostics {
        return Err(format!(
            "{name}: {} diagnostics ({diagnostics:?}), expected {}",
            diagnostics.len(),
            expected.diagnostics
        ));
    }

    Ok(())
}
