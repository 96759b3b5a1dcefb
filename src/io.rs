use std::collections::VecDeque;
use std::fmt::Write as _;
use std::io::{BufRead, Write};

use crate::config::MemoryConfig;
use crate::constants::*;
use crate::manager::MemoryManager;
use crate::memory::BlockStore;
use crate::segment::check_segment_count;
use crate::translation::LogicalAddress;

/// Whitespace-separated tokens pulled from a line-oriented reader on demand
pub struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    pub fn new(reader: R) -> Self {
        Tokens {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// Next token, or `None` once input is exhausted
    pub fn next_token(&mut self) -> Result<Option<String>, String> {
        while self.pending.is_empty() {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| format!("Failed to read input: {}", e))?;
            if read == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }

    fn expect_token(&mut self, what: &str) -> Result<String, String> {
        self.next_token()?
            .ok_or_else(|| format!("Unexpected end of input while reading {}", what))
    }

    fn expect_number(&mut self, what: &str) -> Result<usize, String> {
        let token = self.expect_token(what)?;
        token
            .parse()
            .map_err(|_| format!("Invalid {}: {}", what, token))
    }
}

/// Render the bitmap one row per line, `0` free and `1` used
pub fn render_bitmap(blocks: &BlockStore) -> String {
    let mut out = String::new();
    for row in blocks.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|&used| (if used { BLOCK_USED } else { BLOCK_FREE }).to_string())
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

/// Render every job with its segment and page tables, newest job first
pub fn render_job_table(mm: &MemoryManager) -> String {
    let mut out = String::new();
    for job in mm.jobs() {
        let _ = writeln!(
            out,
            "job: {}, size: {}, segments: {}",
            job.name(),
            job.size(),
            job.segments().len()
        );
        for segment in job.segments() {
            let _ = writeln!(
                out,
                "  segment: {}, state: {}, pages: {}",
                segment.segment_number,
                segment.state,
                segment.page_count()
            );
            for entry in segment.pages() {
                let block = entry
                    .block
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| UNASSIGNED_BLOCK.to_string());
                let _ = writeln!(out, "    page: {}, block: {}", entry.page_number, block);
            }
        }
    }
    out
}

/// Startup values given on the command line; `None` means ask for it
#[derive(Debug, Default, Clone, Copy)]
pub struct StartupValues {
    pub memory_size: Option<usize>,
    pub word_length: Option<usize>,
    pub block_length: Option<usize>,
}

/// Interactive session: prompts on `out`, answers from `input`
pub struct Session<R, W> {
    input: Tokens<R>,
    out: W,
    translate: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Session {
            input: Tokens::new(input),
            out,
            translate: false,
        }
    }

    /// Also ask for a logical address to translate after each admission
    pub fn with_translation(mut self, enabled: bool) -> Self {
        self.translate = enabled;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn say(&mut self, text: &str) -> Result<(), String> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| format!("Failed to write output: {}", e))
    }

    fn ask_number(&mut self, prompt: &str, what: &str) -> Result<usize, String> {
        self.say(prompt)?;
        self.input.expect_number(what)
    }

    /// Collect memory size, word length and block length, asking for any
    /// value not already given
    pub fn read_config(&mut self, preset: StartupValues) -> Result<MemoryConfig, String> {
        let memory_size = match preset.memory_size {
            Some(v) => v,
            None => self.ask_number("memory size: ", "memory size")?,
        };
        let word_length = match preset.word_length {
            Some(v) => v,
            None => self.ask_number("word length: ", "word length")?,
        };
        let block_length = match preset.block_length {
            Some(v) => v,
            None => self.ask_number("block length: ", "block length")?,
        };
        MemoryConfig::new(memory_size, word_length, block_length).map_err(|e| e.to_string())
    }

    /// Run the admit/report/remove loop until `exit` or end of input
    ///
    /// Failed admissions, removals and translations are reported and the
    /// loop goes on; only malformed input or output failure stops it.
    pub fn run(&mut self, mm: &mut MemoryManager) -> Result<(), String> {
        loop {
            self.say(&format!("job name ('{}' to quit): ", EXIT_TOKEN))?;
            let name = match self.input.next_token()? {
                Some(name) if name != EXIT_TOKEN => name,
                _ => return Ok(()),
            };

            let size = self.ask_number("job size: ", "job size")?;
            let segment_count = self.ask_number("segment count: ", "segment count")?;

            // Too many segments: report it without reading page counts
            let admitted = match check_segment_count(segment_count) {
                Ok(()) => {
                    let mut page_counts = Vec::with_capacity(segment_count);
                    for i in 0..segment_count {
                        let pages = self.ask_number(&format!("pages in segment {}: ", i), "page count")?;
                        page_counts.push(pages);
                    }
                    mm.admit(&name, size, &page_counts)
                }
                Err(e) => Err(e),
            };

            match admitted {
                Ok(free) => self.say(&format!("remaining memory: {}\n", free))?,
                Err(e) => self.say(&format!("error: {}\n", e))?,
            }

            self.say("bitmap:\n")?;
            self.say(&render_bitmap(mm.blocks()))?;
            self.say("jobs:\n")?;
            self.say(&render_job_table(mm))?;

            if self.translate {
                self.translate_prompt(mm, &name)?;
            }

            self.say(&format!("job to release ('{}' to skip): ", SKIP_TOKEN))?;
            let target = self.input.expect_token("job to release")?;
            if target != SKIP_TOKEN {
                match mm.remove(&target) {
                    Ok(free) => self.say(&format!(
                        "job {} released\nremaining memory: {}\n",
                        target, free
                    ))?,
                    Err(e) => self.say(&format!("error: {}\n", e))?,
                }
            }

            self.say("bitmap:\n")?;
            self.say(&render_bitmap(mm.blocks()))?;
        }
    }

    fn translate_prompt(&mut self, mm: &MemoryManager, name: &str) -> Result<(), String> {
        self.say(&format!(
            "address in {} to translate (segment page offset, '{}' to skip): ",
            name, SKIP_TOKEN
        ))?;
        let first = self.input.expect_token("segment number")?;
        if first == SKIP_TOKEN {
            return Ok(());
        }
        let segment = first
            .parse()
            .map_err(|_| format!("Invalid segment number: {}", first))?;
        let page = self.input.expect_number("page number")?;
        let offset = self.input.expect_number("offset")?;

        let addr = LogicalAddress::new(segment, page, offset);
        match mm.translate(name, &addr) {
            Ok(pa) => self.say(&format!("{} -> physical address {}\n", addr, pa)),
            Err(e) => self.say(&format!("error: {}\n", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn run_script(config: MemoryConfig, script: &str, translate: bool) -> (MemoryManager, String) {
        let mut mm = MemoryManager::new(config);
        let mut session = Session::new(Cursor::new(script.to_string()), Vec::new()).with_translation(translate);
        session.run(&mut mm).unwrap();
        let out = String::from_utf8(session.into_output()).unwrap();
        (mm, out)
    }

    #[test]
    fn test_tokens_span_lines() {
        let mut tokens = Tokens::new(Cursor::new("a b\n\n  c\n"));
        assert_eq!(tokens.next_token().unwrap(), Some("a".to_string()));
        assert_eq!(tokens.next_token().unwrap(), Some("b".to_string()));
        assert_eq!(tokens.next_token().unwrap(), Some("c".to_string()));
        assert_eq!(tokens.next_token().unwrap(), None);
    }

    #[test]
    fn test_render_bitmap() {
        let mut mm = MemoryManager::new(MemoryConfig::new(96, 1, 4).unwrap()); // 24 blocks, 6 rows
        mm.admit("J1", 0, &[5]).unwrap();

        let bitmap = render_bitmap(mm.blocks());
        let lines: Vec<&str> = bitmap.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "1 1 1 1");
        assert_eq!(lines[1], "1 0 0 0");
        assert_eq!(lines[5], "0 0 0 0");
    }

    #[test]
    fn test_render_job_table() {
        let mut mm = MemoryManager::new(MemoryConfig::new(1024, 1, 8).unwrap());
        mm.admit("J1", 30, &[2]).unwrap();
        mm.admit("J2", 10, &[1]).unwrap();

        let table = render_job_table(&mm);
        assert_eq!(
            table,
            "job: J2, size: 10, segments: 1\n\
             \x20 segment: 0, state: allocated, pages: 1\n\
             \x20   page: 0, block: 2\n\
             job: J1, size: 30, segments: 1\n\
             \x20 segment: 0, state: allocated, pages: 2\n\
             \x20   page: 0, block: 0\n\
             \x20   page: 1, block: 1\n"
        );
    }

    #[test]
    fn test_read_config_prompts_for_missing() {
        let mut session = Session::new(Cursor::new("1\n8\n"), Vec::new());
        let preset = StartupValues {
            memory_size: Some(1024),
            ..Default::default()
        };
        let config = session.read_config(preset).unwrap();
        assert_eq!(config.block_count(), 128);

        let out = String::from_utf8(session.into_output()).unwrap();
        assert!(!out.contains("memory size"));
        assert!(out.contains("word length: "));
        assert!(out.contains("block length: "));
    }

    #[test]
    fn test_read_config_rejects_bad_values() {
        let mut session = Session::new(Cursor::new("1024 0 8"), Vec::new());
        assert!(session.read_config(StartupValues::default()).is_err());

        let mut session = Session::new(Cursor::new("lots"), Vec::new());
        let err = session.read_config(StartupValues::default()).unwrap_err();
        assert_eq!(err, "Invalid memory size: lots");
    }

    #[test]
    fn test_session_scenarios_a_and_b() {
        let config = MemoryConfig::new(1024, 1, 8).unwrap();
        let script = "J1 30 1 3 none\nJ2 20 1 2 J1\nexit\n";
        let (mm, out) = run_script(config, script, false);

        assert!(out.contains("remaining memory: 1021\n"));
        assert!(out.contains("job J1 released\nremaining memory: 1022\n"));
        assert_eq!(mm.used_count(), 2);
        assert!(mm.job("J1").is_none());
        assert_eq!(mm.job("J2").unwrap().bound_blocks().collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_session_reports_failures_and_continues() {
        let config = MemoryConfig::new(64, 1, 8).unwrap(); // 8 blocks
        let script = "big 0 1 9 ghost\nsmall 0 1 2 none\n";
        let (mm, out) = run_script(config, script, false);

        assert!(out.contains("error: not enough memory for job big"));
        assert!(out.contains("error: job ghost not found"));
        assert!(out.contains("remaining memory: 62"));
        assert_eq!(mm.jobs().count(), 1);
    }

    #[test]
    fn test_session_translation_prompt() {
        let config = MemoryConfig::new(1024, 1, 8).unwrap();
        let script = "J1 30 1 3 none none\nJ2 20 1 2 0 1 0 none\nJ3 0 1 1 0 0 8 none\nexit";
        let (_, out) = run_script(config, script, true);

        assert!(out.contains("(s=0, p=1, w=0) -> physical address 32\n"));
        assert!(out.contains("error: invalid address: offset 8 out of range"));
    }

    #[test]
    fn test_session_rejects_too_many_segments_and_continues() {
        let config = MemoryConfig::new(1024, 1, 8).unwrap();
        let script = format!("J 0 {} none\nK 0 1 2 none\nexit\n", MAX_SEGMENTS + 1);
        let (mm, out) = run_script(config, &script, false);

        // Only K's single segment is asked for
        assert_eq!(out.matches("pages in segment").count(), 1);
        assert!(out.contains(&format!(
            "error: invalid job layout: {} segments requested, at most {} allowed\n",
            MAX_SEGMENTS + 1,
            MAX_SEGMENTS
        )));
        assert!(mm.job("J").is_none());
        assert_eq!(mm.job("K").unwrap().bound_blocks().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_session_truncated_input() {
        let mut mm = MemoryManager::new(MemoryConfig::new(1024, 1, 8).unwrap());
        let mut session = Session::new(Cursor::new("J1 30 2 3"), Vec::new());
        let err = session.run(&mut mm).unwrap_err();
        assert_eq!(err, "Unexpected end of input while reading page count");
    }

    #[test]
    fn test_session_invalid_number() {
        let mut mm = MemoryManager::new(MemoryConfig::new(1024, 1, 8).unwrap());
        let mut session = Session::new(Cursor::new("J1 big"), Vec::new());
        assert_eq!(session.run(&mut mm).unwrap_err(), "Invalid job size: big");
    }
}
