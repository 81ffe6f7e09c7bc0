//! Conservative minification for the text assets that ship inside banner
//! folders (HTML/JS/CSS): strips comments and redundant whitespace, and
//! only rewrites a file when the result is actually smaller. None of the
//! pack's crates cover this, so it stays deliberately small rather than
//! pulling in a full parser.

use std::fs;
use std::io;
use std::path::Path;

/// Minifies a supported text file in place. Returns the bytes saved (0 when
/// the file was left alone: unsupported extension, not valid UTF-8, or the
/// minified form was not smaller).
pub fn minify_file(path: &Path) -> io::Result<i64> {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return Ok(0);
    };
    let raw = fs::read(path)?;
    if raw.is_empty() {
        return Ok(0);
    }
    let Ok(source) = String::from_utf8(raw) else {
        return Ok(0);
    };

    let minified = match ext.to_lowercase().as_str() {
        "html" => minify_html(&source),
        "js" => minify_js(&source),
        "css" => minify_css(&source),
        _ => return Ok(0),
    };

    let saved = source.len() as i64 - minified.len() as i64;
    if saved > 0 {
        fs::write(path, minified)?;
        Ok(saved)
    } else {
        Ok(0)
    }
}

/// Drops non-conditional `<!-- -->` comments, trims lines, and removes
/// blank lines. Conditional comments (`<!--[if ...]`) are kept since legacy
/// ad networks still rely on them.
pub fn minify_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("<!--") {
        let after = &rest[start + 4..];
        if after.starts_with('[') {
            // Conditional comment, keep it verbatim through its close.
            match after.find("-->") {
                Some(end) => {
                    out.push_str(&rest[..start + 4 + end + 3]);
                    rest = &after[end + 3..];
                }
                None => break,
            }
        } else {
            out.push_str(&rest[..start]);
            match after.find("-->") {
                Some(end) => rest = &after[end + 3..],
                None => {
                    rest = "";
                    break;
                }
            }
        }
    }
    out.push_str(rest);
    collapse_blank_lines(&out)
}

/// Strips `//` and `/* */` comments outside string and template literals,
/// then drops blank lines. Regex literals containing `//` inside a character
/// class are the known blind spot, same as classic minifiers.
pub fn minify_js(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut string_delim: Option<char> = None;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if let Some(delim) = string_delim {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == delim {
                string_delim = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => {
                string_delim = Some(c);
                out.push(c);
            }
            '/' => match chars.peek() {
                Some('/') => {
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for next in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }
    collapse_blank_lines(&out)
}

/// Strips block comments and collapses whitespace, removing it entirely
/// around punctuation. String values keep their spacing.
pub fn minify_css(source: &str) -> String {
    let stripped = strip_css_comments(source);
    let mut out = String::with_capacity(stripped.len());
    let mut chars = stripped.chars().peekable();
    let mut string_delim: Option<char> = None;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if let Some(delim) = string_delim {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == delim {
                string_delim = None;
            }
            continue;
        }
        if c == '"' || c == '\'' {
            string_delim = Some(c);
            out.push(c);
        } else if c.is_whitespace() {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            let punct = |ch: Option<char>| {
                matches!(ch, None | Some('{' | '}' | ';' | ':' | ',' | '>' | '(' | ')'))
            };
            if !punct(out.chars().last()) && !punct(chars.peek().copied()) {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

fn strip_css_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut string_delim: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(delim) = string_delim {
            out.push(c);
            if c == delim {
                string_delim = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                string_delim = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn collapse_blank_lines(source: &str) -> String {
    source
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn html_comments_removed_conditionals_kept() {
        let source = "<html>\n<!-- plain comment -->\n<!--[if IE]><p>old</p><![endif]-->\n<body></body>\n</html>";
        let out = minify_html(source);
        assert!(!out.contains("plain comment"));
        assert!(out.contains("<!--[if IE]>"));
        assert!(out.contains("<body></body>"));
    }

    #[test]
    fn js_line_and_block_comments_removed() {
        let source = "var a = 1; // trailing\n/* block\n   comment */\nvar b = 2;\n";
        let out = minify_js(source);
        assert!(out.contains("var a = 1;"));
        assert!(out.contains("var b = 2;"));
        assert!(!out.contains("trailing"));
        assert!(!out.contains("comment"));
    }

    #[test]
    fn js_strings_survive_comment_markers() {
        let source = "var url = \"http://example.com\"; var t = `a // b`;";
        let out = minify_js(source);
        assert!(out.contains("http://example.com"));
        assert!(out.contains("`a // b`"));
    }

    #[test]
    fn css_whitespace_collapsed() {
        let source = "body {\n  color : red ;\n  margin : 0 auto ;\n}\n";
        let out = minify_css(source);
        assert_eq!(out, "body{color:red;margin:0 auto;}");
    }

    #[test]
    fn css_comments_removed_strings_kept() {
        let source = "/* header */ a::before { content: \"/* not a comment */\"; }";
        let out = minify_css(source);
        assert!(!out.starts_with("/*"));
        assert!(out.contains("\"/* not a comment */\""));
    }

    #[test]
    fn file_only_rewritten_when_smaller() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.css");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"a{b:c}")
            .unwrap();
        assert_eq!(minify_file(&path).unwrap(), 0);
        assert_eq!(std::fs::read(&path).unwrap(), b"a{b:c}");
    }

    #[test]
    fn file_rewritten_and_savings_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.js");
        let source = "var a = 1; // comment\n\n\nvar b = 2;\n";
        std::fs::write(&path, source).unwrap();
        let saved = minify_file(&path).unwrap();
        assert!(saved > 0);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("comment"));
    }

    #[test]
    fn non_utf8_file_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weird.js");
        std::fs::write(&path, [0xFF, 0xFE, 0x00, 0x41]).unwrap();
        assert_eq!(minify_file(&path).unwrap(), 0);
    }
}
