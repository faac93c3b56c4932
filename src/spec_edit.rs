//! In-place edits of authored `spec.yaml` files.
//!
//! Edits are textual: only the lines being replaced change, so comments,
//! quoting and key order elsewhere in the file stay exactly as written.

use crate::error::{CatalogError, Result};
use chrono::NaiveDate;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

const TOOLS_KEY: &str = "tools";
const DEFAULT_ITEM_INDENT: &str = "  ";

/// Replace the `tools` list, appending the key when the document lacks it.
pub fn update_spec_tools(path: &Path, tools: &[String]) -> Result<()> {
    let raw = fs::read_to_string(path).map_err(|err| CatalogError::io(path, err))?;
    let updated = replace_tools_block(&raw, tools)?;
    fs::write(path, updated).map_err(|err| CatalogError::io(path, err))
}

fn replace_tools_block(raw: &str, tools: &[String]) -> Result<String> {
    match serde_yaml::from_str::<Value>(raw)? {
        Value::Mapping(_) => {}
        _ => return Err(CatalogError::NotAMapping),
    }

    let lines: Vec<&str> = raw.split_inclusive('\n').collect();
    let Some(start) = lines.iter().position(|line| tools_key_rest(line).is_some()) else {
        let mut out = raw.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&render_tools_block(tools, "", DEFAULT_ITEM_INDENT)?);
        return Ok(out);
    };

    // The block runs through the last indented or `- ` line; blank and
    // comment lines after it belong to whatever follows.
    let mut end = start + 1;
    for (index, line) in lines.iter().enumerate().skip(start + 1) {
        if is_block_line(line) {
            end = index + 1;
        } else if !is_blank_or_comment(line) {
            break;
        }
    }

    let key_comment = tools_key_rest(lines[start])
        .map(str::trim_start)
        .filter(|rest| rest.starts_with('#'))
        .map(|comment| format!(" {}", comment.trim_end()))
        .unwrap_or_default();
    let indent = lines[start + 1..end]
        .iter()
        .copied()
        .find(|line| line.trim_start().starts_with('-'))
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .unwrap_or(DEFAULT_ITEM_INDENT);

    let mut out: String = lines[..start].concat();
    out.push_str(&render_tools_block(tools, &key_comment, indent)?);
    out.push_str(&lines[end..].concat());
    Ok(out)
}

/// Text after `tools:` when the line opens the top-level `tools` key.
fn tools_key_rest(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix(TOOLS_KEY)
        .or_else(|| line.strip_prefix("\"tools\""))
        .or_else(|| line.strip_prefix("'tools'"))?
        .trim_start_matches([' ', '\t'])
        .strip_prefix(':')?;
    if rest.is_empty() || rest.starts_with([' ', '\t', '\n', '\r']) {
        Some(rest)
    } else {
        None
    }
}

fn is_block_line(line: &str) -> bool {
    (line.starts_with([' ', '\t']) && !line.trim().is_empty())
        || (line.starts_with('-') && !line.starts_with("---"))
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn render_tools_block(tools: &[String], key_comment: &str, indent: &str) -> Result<String> {
    if tools.is_empty() {
        return Ok(format!("{TOOLS_KEY}: []{key_comment}\n"));
    }
    let mut block = format!("{TOOLS_KEY}:{key_comment}\n");
    for tool in tools {
        let scalar = serde_yaml::to_string(&Value::String(tool.clone()))?;
        block.push_str(&format!("{indent}- {}\n", scalar.trim_end()));
    }
    Ok(block)
}

/// Insert a dated two-line warning ahead of the document body. Returns
/// `false` without touching the file when the same warning is already there.
pub fn add_warning_comment(path: &Path, warning: &str, detail: &str, date: NaiveDate) -> Result<bool> {
    let raw = fs::read_to_string(path).map_err(|err| CatalogError::io(path, err))?;
    if raw.contains(warning) {
        return Ok(false);
    }
    let (header, body) = split_leading_comments(&raw);
    let stamped = format!(
        "{header}# WARNING: {warning} on {}\n# {detail}\n{body}",
        date.format("%Y-%m-%d")
    );
    fs::write(path, stamped).map_err(|err| CatalogError::io(path, err))?;
    Ok(true)
}

/// Split off comment and blank lines that precede the first content line.
fn split_leading_comments(raw: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            break;
        }
        offset += line.len();
    }
    raw.split_at(offset)
}
