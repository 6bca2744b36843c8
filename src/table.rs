use std::borrow::Cow;
use std::fmt::Write as _;

use crate::annotation::Alignment;

/// Renders an ASCII table; `alignments` applies per column (missing entries
/// are left-aligned).
pub fn render_table(headers: &[String], rows: &[Vec<String>], alignments: &[Alignment]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();

    let header_line = format_row(headers, &widths, alignments);
    let _ = writeln!(output, "{header_line}");

    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<usize>>();
    let separator_cells = separator_widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>();
    let separator_line = format_row(&separator_cells, &separator_widths, &[]);
    let _ = writeln!(output, "{separator_line}");

    for row in rows {
        let row_line = format_row(row, &widths, alignments);
        let _ = writeln!(output, "{row_line}");
    }

    output
}

fn format_row(values: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        if idx >= widths.len() {
            break;
        }
        let sanitized = sanitize_cell(value);
        let display = display_width(sanitized.as_ref());
        let padding = widths[idx].saturating_sub(display);
        let (before, after) = match alignments.get(idx).copied().unwrap_or_default() {
            Alignment::Left => (0, padding),
            Alignment::Right => (padding, 0),
            Alignment::Center => (padding / 2, padding - padding / 2),
        };
        cells.push(format!(
            "{}{}{}",
            " ".repeat(before),
            sanitized,
            " ".repeat(after)
        ));
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn columns_are_padded_per_alignment() {
        let rendered = render_table(
            &strings(&["Name", "Count", "Mid"]),
            &[strings(&["a", "7", "x"]), strings(&["bbbbbb", "12", "yyy"])],
            &[Alignment::Left, Alignment::Right, Alignment::Center],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Name    Count  Mid");
        assert_eq!(lines[1], "------  -----  ---");
        assert_eq!(lines[2], "a           7   x");
        assert_eq!(lines[3], "bbbbbb     12  yyy");
    }

    #[test]
    fn control_characters_are_flattened() {
        let rendered = render_table(&strings(&["A"]), &[strings(&["x\ny"])], &[]);
        assert!(rendered.lines().any(|line| line == "x y"));
    }
}
