use std::fs;
use std::path::Path;

use crate::{Error, Result};

pub const ENVBLK_SIGNATURE: &str = "# GRUB Environment Block\n";
pub const DEFAULT_ENVBLK_SIZE: usize = 1024;

/// Fixed size environment block file.
///
/// The block starts with [`ENVBLK_SIGNATURE`], holds one `name=value` line
/// per variable and is padded with `#` up to its size. Inside values a
/// backslash escapes the next character, so backslashes and newlines survive.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EnvBlock {
    size: usize,
    vars: Vec<(String, String)>,
}

impl Default for EnvBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvBlock {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_ENVBLK_SIZE)
    }

    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            vars: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read(path)?)
    }

    pub fn parse(buf: &[u8]) -> Result<Self> {
        if !buf.starts_with(ENVBLK_SIGNATURE.as_bytes()) {
            return Err(Error::InvalidEnvBlock("missing signature".to_owned()));
        }
        let text = std::str::from_utf8(&buf[ENVBLK_SIGNATURE.len()..])
            .map_err(|e| Error::InvalidEnvBlock(e.to_string()))?;

        let mut vars: Vec<(String, String)> = Vec::new();
        for line in split_lines(text) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.find('=') {
                Some(x) => {
                    let name = &line[..x];
                    let value = unescape(&line[x + 1..]);
                    if let Some(slot) = vars.iter_mut().find(|(n, _)| n == name) {
                        slot.1 = value;
                    } else {
                        vars.push((name.to_owned(), value));
                    }
                }
                None => warn!("ignoring malformed environment block line {:?}", line),
            }
        }

        Ok(Self {
            size: buf.len(),
            vars,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut s = String::with_capacity(self.size);
        s += ENVBLK_SIGNATURE;
        for (name, value) in self.vars.iter() {
            s += name;
            s.push('=');
            escape_into(&mut s, value);
            s.push('\n');
        }

        if s.len() > self.size {
            return Err(Error::InvalidEnvBlock(format!(
                "{} bytes of variables do not fit into a {} byte block",
                s.len(),
                self.size
            )));
        }

        let mut buf = s.into_bytes();
        buf.resize(self.size, b'#');
        Ok(buf)
    }

    /// Writes the block next to `path` first and renames it into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        let buf = self.to_bytes()?;
        let tmp = path.with_extension("new");
        fs::write(&tmp, &buf)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.vars.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_owned();
        } else {
            self.vars.push((name.to_owned(), value.to_owned()));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Splits at newlines that are not escaped by a backslash.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(c) = chars.next() {
                out.push(c);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == '\\' || c == '\n' {
            out.push('\\');
        }
        out.push(c);
    }
}
