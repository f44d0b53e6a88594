//! Terminal output for query results

use crate::engine::{DocResult, EngineStats, FindResult, Span};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn color_choice(color: bool) -> ColorChoice {
    if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Print a snippet with every occurrence of `needle` highlighted
pub fn print_doc(doc: &DocResult, needle: &[u8], color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));
    write_doc(&mut stdout, doc, &doc.spans(needle))
}

/// Print a snippet with the `needle_len` bytes at its occurrence highlighted
pub fn print_doc_at(doc: &DocResult, needle_len: u64, color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));
    write_doc(&mut stdout, doc, &doc.needle_spans(needle_len))
}

/// Write a snippet: a header line, the metadata record if any, then `spans`
pub fn write_doc<W: WriteColor>(out: &mut W, doc: &DocResult, spans: &[Span]) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    write!(out, "doc {}", doc.doc_ix)?;
    out.reset()?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(
        out,
        " [{}..{} of {}]",
        doc.disp_start,
        doc.disp_start + doc.disp_len,
        doc.doc_len
    )?;
    out.reset()?;

    if !doc.metadata.is_empty() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(out, "{}", String::from_utf8_lossy(&doc.metadata))?;
        out.reset()?;
    }

    for span in spans {
        let text = String::from_utf8_lossy(span.bytes());
        if let Span::Highlight(_) = span {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "{}", text)?;
            out.reset()?;
        } else {
            write!(out, "{}", text)?;
        }
    }
    writeln!(out)?;

    Ok(())
}

/// Print per-shard occurrence counts
pub fn print_find(result: &FindResult, color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));

    for (shard, seg) in result.segment_by_shard.iter().enumerate() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(stdout, "shard {}", shard)?;
        stdout.reset()?;
        writeln!(stdout, ": [{}, {}) {}", seg.lo, seg.hi, seg.width())?;
    }

    stdout.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(stdout, "total: {}", result.count)?;
    stdout.reset()?;

    Ok(())
}

/// Print engine size figures
pub fn print_stats(stats: &EngineStats) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    match stats.load_mode {
        Some(mode) => writeln!(stdout, "Load mode: {:?}", mode)?,
        None => writeln!(stdout, "Load mode: in-memory")?,
    }
    writeln!(stdout, "Documents: {}", stats.doc_count)?;
    writeln!(stdout, "Text size: {}", format_bytes(stats.text_len))?;

    for s in &stats.shards {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(stdout, "  shard {}", s.shard)?;
        stdout.reset()?;
        write!(stdout, ": {} docs, {} text", s.doc_count, format_bytes(s.text_len))?;
        match s.meta_len {
            Some(len) => writeln!(stdout, ", {} metadata", format_bytes(len))?,
            None => writeln!(stdout)?,
        }
    }

    Ok(())
}

/// Human-readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    #[test]
    fn test_write_doc_plain() {
        let doc = DocResult {
            doc_ix: 2,
            doc_len: 9,
            disp_start: 0,
            disp_len: 9,
            needle_offset: 4,
            metadata: b"{\"id\":2}".to_vec(),
            text: b"say hello".to_vec(),
        };
        let mut out = NoColor::new(Vec::new());
        write_doc(&mut out, &doc, &doc.spans(b"hello")).unwrap();
        let printed = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(printed, "doc 2 [0..9 of 9]\n{\"id\":2}\nsay hello\n");
    }

    #[test]
    fn test_write_doc_highlights_occurrence() {
        let doc = DocResult {
            doc_ix: 0,
            doc_len: 11,
            disp_start: 2,
            disp_len: 7,
            needle_offset: 4,
            metadata: Vec::new(),
            text: b"llo wor".to_vec(),
        };
        let mut out = termcolor::Ansi::new(Vec::new());
        write_doc(&mut out, &doc, &doc.needle_spans(3)).unwrap();
        let printed = String::from_utf8(out.into_inner()).unwrap();
        assert!(printed.starts_with("\x1b[0m\x1b[1m\x1b[35mdoc 0"));
        assert!(printed.contains(" [2..9 of 11]"));
        assert!(printed.contains("llo \x1b[0m\x1b[1m\x1b[31mwor\x1b[0m\n"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }
}
