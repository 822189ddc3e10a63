use crate::error::RleError;
use crate::grid::Grid;
use crate::pattern::{Pattern, PatternCategory, PatternMetadata};

// Larger declarations are rejected before anything is allocated.
pub const MAX_PATTERN_CELLS: usize = 1 << 22;

pub fn parse(text: &str) -> Result<Pattern, RleError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    if lines.peek().is_none() {
        return Err(RleError::Empty);
    }

    let mut meta = PatternMetadata::new("", "", PatternCategory::Custom);
    while let Some(line) = lines.next_if(|l| l.starts_with('#')) {
        let mut chars = line[1..].chars();
        let key = chars.next().ok_or_else(|| RleError::Header(line.to_string()))?;
        let value = chars.as_str().trim().to_string();
        match key {
            'N' | 'n' => meta.name = value,
            'O' | 'o' => meta.author = Some(value).filter(|v| !v.is_empty()),
            'C' | 'c' => {
                if !meta.description.is_empty() {
                    meta.description.push('\n');
                }
                meta.description.push_str(&value);
            }
            _ => return Err(RleError::Header(line.to_string())),
        }
    }

    let dims_line = lines.next().ok_or(RleError::MissingData)?;
    let (width, height) = parse_dimensions(dims_line)?;

    let data: String = lines.flat_map(|l| l.chars()).filter(|c| !c.is_whitespace()).collect();
    let cells = parse_body(&data, width, height)?;
    Ok(Pattern::new(meta, cells))
}

fn parse_dimensions(line: &str) -> Result<(usize, usize), RleError> {
    let bad = || RleError::Dimensions(line.to_string());
    let mut width = None;
    let mut height = None;
    for part in line.split(',') {
        let (key, value) = part.split_once('=').ok_or_else(bad)?;
        match key.trim() {
            "x" => width = Some(value.trim().parse::<usize>().map_err(|_| bad())?),
            "y" => height = Some(value.trim().parse::<usize>().map_err(|_| bad())?),
            "rule" => {}
            _ => return Err(bad()),
        }
    }
    let (Some(w), Some(h)) = (width, height) else {
        return Err(bad());
    };
    match w.checked_mul(h) {
        Some(cells) if cells <= MAX_PATTERN_CELLS => Ok((w, h)),
        _ => Err(bad()),
    }
}

fn parse_body(data: &str, width: usize, height: usize) -> Result<Grid, RleError> {
    let mut grid = Grid::new(width, height);
    let (mut x, mut y) = (0usize, 0usize);
    let mut run = 0usize;
    let mut terminated = false;

    for ch in data.chars() {
        if let Some(d) = ch.to_digit(10) {
            run = run.saturating_mul(10).saturating_add(d as usize);
            continue;
        }
        let count = if run == 0 { 1 } else { run };
        run = 0;
        match ch {
            'b' => {
                x = x
                    .checked_add(count)
                    .filter(|&x| x <= width)
                    .ok_or(RleError::TooWide(width))?;
            }
            'o' => {
                if y >= height {
                    return Err(RleError::TooTall(height));
                }
                if x.checked_add(count).map_or(true, |end| end > width) {
                    return Err(RleError::TooWide(width));
                }
                for _ in 0..count {
                    grid.set(x, y, true);
                    x += 1;
                }
            }
            '$' => {
                y = y.checked_add(count).ok_or(RleError::TooTall(height))?;
                x = 0;
            }
            '!' => {
                terminated = true;
                break;
            }
            other => return Err(RleError::Character(other)),
        }
    }

    if !terminated {
        return Err(RleError::Unterminated);
    }
    if y >= height && height > 0 {
        return Err(RleError::TooTall(height));
    }
    Ok(grid)
}

fn push_run(out: &mut String, count: usize, tag: char) {
    if count > 1 {
        out.push_str(&count.to_string());
    }
    out.push(tag);
}

pub fn encode(pattern: &Pattern) -> String {
    let meta = &pattern.metadata;
    let mut lines = vec![format!("#N {}", meta.name)];
    if let Some(author) = &meta.author {
        lines.push(format!("#O {author}"));
    }
    if !meta.description.is_empty() {
        for line in meta.description.lines() {
            lines.push(format!("#C {line}"));
        }
    }
    lines.push(format!("x = {}, y = {}", pattern.width(), pattern.height()));

    let mut body = String::new();
    for y in 0..pattern.height() {
        if y > 0 {
            body.push('$');
        }
        let row = pattern.cells.row(y);
        let mut iter = row.iter().copied();
        let Some(mut current) = iter.next() else {
            continue;
        };
        let mut count = 1;
        for cell in iter {
            if cell == current {
                count += 1;
            } else {
                push_run(&mut body, count, if current { 'o' } else { 'b' });
                current = cell;
                count = 1;
            }
        }
        push_run(&mut body, count, if current { 'o' } else { 'b' });
    }
    body.push('!');
    lines.push(body);
    lines.join("\n")
}
